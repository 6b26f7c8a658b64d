//! Configuration file support
//!
//! A configuration file is a TOML document whose sections mirror the
//! command line:
//!
//! ```toml
//! [Input]
//! input = "nc.exe"
//!
//! [Output]
//! output = "nc.scr"
//! legacy_tail = false
//! verbose = 1
//! ```
//!
//! Every recognised option is declared in [`OPTIONS`] with the kind its value
//! is coerced to. Parsing is a pure step producing a [`Settings`] value; the
//! caller owns it and passes it around explicitly.

use crate::error::ConfigError;
use log::debug;
use std::collections::BTreeMap;
use std::path::Path;

pub const SECTION_INPUT: &str = "Input";
pub const SECTION_OUTPUT: &str = "Output";

pub const OPT_INPUT: &str = "input";
pub const OPT_OUTPUT: &str = "output";
pub const OPT_LEGACY_TAIL: &str = "legacy_tail";
pub const OPT_VERBOSE: &str = "verbose";

/// Options of which at least one must be supplied by the file or the caller
pub const MANDATORY_INPUTS: &[&str] = &[OPT_INPUT];

/// The value kind an option is declared with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Boolean,
    Integer,
    Float,
    String,
}

/// A coerced option value
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

/// A recognised configuration option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDecl {
    pub section: &'static str,
    pub name: &'static str,
    pub kind: OptionKind,
}

/// All options understood by the tool
pub const OPTIONS: &[OptionDecl] = &[
    OptionDecl { section: SECTION_INPUT, name: OPT_INPUT, kind: OptionKind::String },
    OptionDecl { section: SECTION_OUTPUT, name: OPT_OUTPUT, kind: OptionKind::String },
    OptionDecl { section: SECTION_OUTPUT, name: OPT_LEGACY_TAIL, kind: OptionKind::Boolean },
    OptionDecl { section: SECTION_OUTPUT, name: OPT_VERBOSE, kind: OptionKind::Integer },
];

impl OptionKind {
    /// Coerce a raw TOML value to this kind
    ///
    /// An empty string leaves the option unset and yields `Ok(None)`.
    pub fn coerce(self, option: &str, raw: &toml::Value) -> Result<Option<OptionValue>, ConfigError> {
        if let toml::Value::String(s) = raw {
            if s.trim().is_empty() {
                return Ok(None);
            }
        }

        let value = match self {
            OptionKind::Boolean => OptionValue::Boolean(coerce_bool(option, raw)?),
            OptionKind::Integer => OptionValue::Integer(coerce_int(option, raw)?),
            OptionKind::Float => OptionValue::Float(coerce_float(option, raw)?),
            OptionKind::String => match raw {
                toml::Value::String(s) => OptionValue::String(s.clone()),
                other => return Err(invalid(option, format!("expected a string, found {}", other.type_str()))),
            },
        };
        Ok(Some(value))
    }
}

fn invalid(option: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        option: option.to_string(),
        reason: reason.into(),
    }
}

fn coerce_bool(option: &str, raw: &toml::Value) -> Result<bool, ConfigError> {
    match raw {
        toml::Value::Boolean(b) => Ok(*b),
        toml::Value::Integer(0) => Ok(false),
        toml::Value::Integer(1) => Ok(true),
        toml::Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "yes" | "true" | "on" => Ok(true),
            "0" | "no" | "false" | "off" => Ok(false),
            _ => Err(invalid(option, format!("not a boolean: '{}'", s))),
        },
        other => Err(invalid(option, format!("expected a boolean, found {}", other.type_str()))),
    }
}

fn coerce_int(option: &str, raw: &toml::Value) -> Result<i64, ConfigError> {
    match raw {
        toml::Value::Integer(i) => Ok(*i),
        toml::Value::String(s) => s
            .trim()
            .parse()
            .map_err(|e| invalid(option, format!("invalid integer '{}': {}", s, e))),
        other => Err(invalid(option, format!("expected an integer, found {}", other.type_str()))),
    }
}

fn coerce_float(option: &str, raw: &toml::Value) -> Result<f64, ConfigError> {
    match raw {
        toml::Value::Float(f) => Ok(*f),
        toml::Value::Integer(i) => Ok(*i as f64),
        toml::Value::String(s) => s
            .trim()
            .parse()
            .map_err(|e| invalid(option, format!("invalid float '{}': {}", s, e))),
        other => Err(invalid(option, format!("expected a float, found {}", other.type_str()))),
    }
}

/// Resolved option values, keyed by option name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    values: BTreeMap<&'static str, OptionValue>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option, replacing any previous value
    pub fn set(&mut self, option: &'static str, value: OptionValue) {
        self.values.insert(option, value);
    }

    /// Builder form of [`Settings::set`]
    pub fn with(mut self, option: &'static str, value: OptionValue) -> Self {
        self.set(option, value);
        self
    }

    pub fn contains(&self, option: &str) -> bool {
        self.values.contains_key(option)
    }

    pub fn get_str(&self, option: &str) -> Option<&str> {
        match self.values.get(option) {
            Some(OptionValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn get_bool(&self, option: &str) -> Option<bool> {
        match self.values.get(option) {
            Some(OptionValue::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn get_int(&self, option: &str) -> Option<i64> {
        match self.values.get(option) {
            Some(OptionValue::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    /// Parse configuration text, then apply `overrides` on top
    ///
    /// `overrides` holds values given on the command line; they take
    /// precedence and also satisfy mandatory options missing from the file.
    pub fn parse(text: &str, overrides: &Settings) -> Result<Settings, ConfigError> {
        debug!("parsing configuration file");

        let table: toml::Table = toml::from_str(text)?;

        if !table.get(SECTION_INPUT).is_some_and(toml::Value::is_table) {
            return Err(ConfigError::MissingSection { section: SECTION_INPUT });
        }

        let mut settings = Settings::new();
        for decl in OPTIONS {
            let raw = table
                .get(decl.section)
                .and_then(toml::Value::as_table)
                .and_then(|section| section.get(decl.name));

            match raw {
                Some(raw) => {
                    if let Some(value) = decl.kind.coerce(decl.name, raw)? {
                        settings.set(decl.name, value);
                    }
                }
                None => debug!(
                    "missing requested option '{}' (section '{}') in the configuration file, skipping",
                    decl.name, decl.section
                ),
            }
        }

        for (option, value) in &overrides.values {
            settings.set(*option, value.clone());
        }

        if !MANDATORY_INPUTS.iter().any(|option| settings.contains(option)) {
            return Err(ConfigError::MissingMandatoryOption {
                options: MANDATORY_INPUTS.to_vec(),
            });
        }

        Ok(settings)
    }

    /// Read and parse a configuration file
    pub fn load(path: &Path, overrides: &Settings) -> Result<Settings, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let text = r#"
[Input]
input = "nc.exe"

[Output]
output = "nc.scr"
legacy_tail = "yes"
verbose = 2
"#;
        let settings = Settings::parse(text, &Settings::new()).unwrap();

        assert_eq!(settings.get_str(OPT_INPUT), Some("nc.exe"));
        assert_eq!(settings.get_str(OPT_OUTPUT), Some("nc.scr"));
        assert_eq!(settings.get_bool(OPT_LEGACY_TAIL), Some(true));
        assert_eq!(settings.get_int(OPT_VERBOSE), Some(2));
    }

    #[test]
    fn test_missing_options_are_skipped() {
        let settings = Settings::parse("[Input]\ninput = \"a.bin\"\n", &Settings::new()).unwrap();

        assert_eq!(settings.get_str(OPT_INPUT), Some("a.bin"));
        assert!(!settings.contains(OPT_OUTPUT));
        assert_eq!(settings.get_bool(OPT_LEGACY_TAIL), None);
    }

    #[test]
    fn test_missing_input_section() {
        let err = Settings::parse("[Output]\noutput = \"x\"\n", &Settings::new()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection { section: "Input" }));

        // A scalar named like the section does not count
        let err = Settings::parse("Input = 1\n", &Settings::new()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection { .. }));
    }

    #[test]
    fn test_missing_mandatory_input() {
        let err = Settings::parse("[Input]\n", &Settings::new()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingMandatoryOption { .. }));
        assert!(err.to_string().contains("input"));

        // An empty value is treated as unset
        let err = Settings::parse("[Input]\ninput = \"\"\n", &Settings::new()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingMandatoryOption { .. }));
    }

    #[test]
    fn test_overrides_satisfy_and_take_precedence() {
        let overrides = Settings::new()
            .with(OPT_INPUT, OptionValue::String("cli.bin".into()))
            .with(OPT_LEGACY_TAIL, OptionValue::Boolean(false));

        let settings = Settings::parse("[Input]\n", &overrides).unwrap();
        assert_eq!(settings.get_str(OPT_INPUT), Some("cli.bin"));

        let text = "[Input]\ninput = \"file.bin\"\n[Output]\nlegacy_tail = true\n";
        let settings = Settings::parse(text, &overrides).unwrap();
        assert_eq!(settings.get_str(OPT_INPUT), Some("cli.bin"));
        assert_eq!(settings.get_bool(OPT_LEGACY_TAIL), Some(false));
    }

    #[test]
    fn test_invalid_toml() {
        let err = Settings::parse("[Input\ninput = ", &Settings::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Syntax(_)));
    }

    #[test]
    fn test_invalid_value() {
        let text = "[Input]\ninput = \"a\"\n[Output]\nverbose = \"lots\"\n";
        let err = Settings::parse(text, &Settings::new()).unwrap_err();
        match err {
            ConfigError::InvalidValue { option, .. } => assert_eq!(option, "verbose"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_coerce_boolean() {
        let kind = OptionKind::Boolean;
        let coerce = |v: toml::Value| kind.coerce("flag", &v).unwrap();

        assert_eq!(coerce(toml::Value::Boolean(true)), Some(OptionValue::Boolean(true)));
        assert_eq!(coerce(toml::Value::String("Off".into())), Some(OptionValue::Boolean(false)));
        assert_eq!(coerce(toml::Value::String("1".into())), Some(OptionValue::Boolean(true)));
        assert_eq!(coerce(toml::Value::Integer(0)), Some(OptionValue::Boolean(false)));
        assert_eq!(coerce(toml::Value::String(String::new())), None);

        assert!(kind.coerce("flag", &toml::Value::String("maybe".into())).is_err());
        assert!(kind.coerce("flag", &toml::Value::Integer(2)).is_err());
    }

    #[test]
    fn test_coerce_integer() {
        let kind = OptionKind::Integer;

        assert_eq!(
            kind.coerce("n", &toml::Value::Integer(-3)).unwrap(),
            Some(OptionValue::Integer(-3))
        );
        assert_eq!(
            kind.coerce("n", &toml::Value::String(" 42 ".into())).unwrap(),
            Some(OptionValue::Integer(42))
        );
        assert!(kind.coerce("n", &toml::Value::Float(1.5)).is_err());
        assert!(kind.coerce("n", &toml::Value::String("4x".into())).is_err());
    }

    #[test]
    fn test_coerce_float() {
        let kind = OptionKind::Float;

        assert_eq!(
            kind.coerce("f", &toml::Value::Float(0.5)).unwrap(),
            Some(OptionValue::Float(0.5))
        );
        assert_eq!(
            kind.coerce("f", &toml::Value::Integer(2)).unwrap(),
            Some(OptionValue::Float(2.0))
        );
        assert_eq!(
            kind.coerce("f", &toml::Value::String("1.25".into())).unwrap(),
            Some(OptionValue::Float(1.25))
        );
        assert!(kind.coerce("f", &toml::Value::Boolean(true)).is_err());
    }

    #[test]
    fn test_coerce_string() {
        let kind = OptionKind::String;

        assert_eq!(
            kind.coerce("s", &toml::Value::String("x.bin".into())).unwrap(),
            Some(OptionValue::String("x.bin".into()))
        );
        assert!(kind.coerce("s", &toml::Value::Integer(1)).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dbgscript.toml");
        std::fs::write(&path, "[Input]\ninput = \"payload.exe\"\n").unwrap();

        let settings = Settings::load(&path, &Settings::new()).unwrap();
        assert_eq!(settings.get_str(OPT_INPUT), Some("payload.exe"));

        let err = Settings::load(&dir.path().join("nope.toml"), &Settings::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
