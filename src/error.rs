//! Error types

use std::path::PathBuf;

/// Error produced while turning a binary file into a debug script
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// The input path does not exist or is not a regular file
    #[error("the provided input file '{}' is not a regular file", path.display())]
    InvalidInputPath { path: PathBuf },

    /// The input does not fit into the target's load segment
    #[error("input is {size} bytes, debug.exe can load at most {limit} bytes")]
    SizeLimitExceeded { size: u64, limit: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Error produced while loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file is not valid TOML
    #[error("invalid or unreadable configuration file ({0})")]
    Syntax(#[from] toml::de::Error),

    /// A mandatory section is absent
    #[error("missing a mandatory section '{section}' in the configuration file")]
    MissingSection { section: &'static str },

    /// None of the options that can satisfy a requirement were supplied
    #[error("missing a mandatory option in the configuration file ({})", options.join(", "))]
    MissingMandatoryOption { options: Vec<&'static str> },

    /// An option value could not be coerced to its declared kind
    #[error("error occurred while processing the option '{option}' ({reason})")]
    InvalidValue { option: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
