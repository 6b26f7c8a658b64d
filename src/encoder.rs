//! Debug script encoder

use crate::error::EncodeError;
use crate::script::{Command, Register, Run, Script, LOAD_OFFSET, MAX_INPUT_SIZE};
use log::{debug, info, warn};
use std::fs;
use std::path::Path;

/// What to do with a run that is still open when the input ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingRun {
    /// Emit the pending run so every nonzero byte is written
    #[default]
    Flush,
    /// Discard the pending run, matching the output of the legacy dbgtool
    Drop,
}

/// Encodes binary files into debug.exe scripts
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    trailing_run: TrailingRun,
}

impl Encoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the policy for a run left open at the end of the input
    pub fn with_trailing_run(mut self, policy: TrailingRun) -> Self {
        self.trailing_run = policy;
        self
    }

    pub fn trailing_run(&self) -> TrailingRun {
        self.trailing_run
    }

    /// Build the command list for `data`, to be saved as `name`
    pub fn build(&self, data: &[u8], name: &str) -> Result<Script, EncodeError> {
        check_size(data.len() as u64)?;

        let mut script = Script::new();
        script.push(Command::name(name));
        script.push(Command::SetRegister {
            register: Register::Cx,
            value: data.len() as u32,
        });
        script.push(Command::clear_segment());

        // The fill above zeroes the segment, so only nonzero bytes are entered
        let mut pending: Option<Run> = None;
        for (offset, &byte) in data.iter().enumerate() {
            let address = LOAD_OFFSET + offset as u32;

            if byte != 0 {
                match pending.as_mut() {
                    Some(run) => run.push(byte),
                    None => pending = Some(Run::new(address, byte)),
                }
            } else if let Some(run) = pending.take() {
                flush(&mut script, run);
            }

            if pending.as_ref().is_some_and(Run::is_full) {
                if let Some(run) = pending.take() {
                    flush(&mut script, run);
                }
            }
        }

        if let Some(run) = pending.take() {
            match self.trailing_run {
                TrailingRun::Flush => flush(&mut script, run),
                TrailingRun::Drop => warn!(
                    "dropping {} trailing byte(s) at {:x}, the script will not rebuild the file exactly",
                    run.len(),
                    run.address
                ),
            }
        }

        script.push(Command::Write);
        script.push(Command::Quit);

        info!(
            "encoded {} ({} bytes) into {} write command(s)",
            name,
            data.len(),
            script.runs().count()
        );

        Ok(script)
    }

    /// Encode `data` into script text
    pub fn encode(&self, data: &[u8], name: &str) -> Result<String, EncodeError> {
        Ok(self.build(data, name)?.render())
    }

    /// Encode `data` directly to a writer
    pub fn encode_to_writer<W: std::io::Write>(
        &self,
        data: &[u8],
        name: &str,
        mut writer: W,
    ) -> Result<(), EncodeError> {
        let encoded = self.encode(data, name)?;
        writer.write_all(encoded.as_bytes())?;
        Ok(())
    }

    /// Encode `data` to a script file, replacing any existing content
    pub fn encode_to_file(&self, data: &[u8], name: &str, path: &Path) -> Result<(), EncodeError> {
        let encoded = self.encode(data, name)?;
        fs::write(path, encoded)?;
        Ok(())
    }

    /// Read and encode a file, naming the output after the file
    ///
    /// The size is checked before the file is read, so oversized inputs are
    /// rejected without loading them.
    pub fn encode_path(&self, path: &Path) -> Result<String, EncodeError> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) if metadata.is_file() => metadata,
            _ => {
                return Err(EncodeError::InvalidInputPath {
                    path: path.to_path_buf(),
                })
            }
        };
        check_size(metadata.len())?;

        let data = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.encode(&data, &name)
    }
}

fn check_size(size: u64) -> Result<(), EncodeError> {
    if size > MAX_INPUT_SIZE as u64 {
        return Err(EncodeError::SizeLimitExceeded {
            size,
            limit: MAX_INPUT_SIZE as u64,
        });
    }
    Ok(())
}

fn flush(script: &mut Script, run: Run) {
    debug_assert!(!run.is_empty());
    debug!("run at {:x}, {} byte(s)", run.address, run.len());
    script.push(Command::Enter(run));
}
