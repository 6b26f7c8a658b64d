//! Debug script data structures

use std::fmt;

// Target memory layout constants
pub const LOAD_OFFSET: u32 = 0x100;
pub const SEGMENT_END: u32 = 0xffff;
/// Largest file debug.exe can load into a single segment
pub const MAX_INPUT_SIZE: usize = 65280;
/// debug.exe accepts at most this many byte tokens on one `e` line
pub const MAX_RUN_LEN: usize = 20;

// debug.exe command letters
const CMD_NAME: &str = "n";
const CMD_REGISTER: &str = "r";
const CMD_FILL: &str = "f";
const CMD_ENTER: &str = "e";
const CMD_WRITE: &str = "w";
const CMD_QUIT: &str = "q";

/// CPU register addressed by an `r` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    /// Low word of the file size used by `w`
    Cx,
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::Cx => f.write_str("cx"),
        }
    }
}

/// A group of consecutive nonzero bytes written by one `e` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    /// Load address of the first byte
    pub address: u32,
    /// Byte values, never more than [`MAX_RUN_LEN`]
    pub bytes: Vec<u8>,
}

impl Run {
    /// Open a run at `address` holding its first byte
    pub fn new(address: u32, first: u8) -> Self {
        let mut bytes = Vec::with_capacity(MAX_RUN_LEN);
        bytes.push(first);
        Self { address, bytes }
    }

    pub fn push(&mut self, byte: u8) {
        debug_assert!(!self.is_full());
        self.bytes.push(byte);
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the run reached the per-line token limit
    pub fn is_full(&self) -> bool {
        self.bytes.len() >= MAX_RUN_LEN
    }

    /// Address one past the last byte of the run
    pub fn end(&self) -> u32 {
        self.address + self.bytes.len() as u32
    }
}

impl fmt::Display for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:x}", CMD_ENTER, self.address)?;
        for byte in &self.bytes {
            write!(f, " {:02x}", byte)?;
        }
        Ok(())
    }
}

/// A single debug.exe command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `n <name>`: name of the file `w` writes
    Name(String),
    /// `r <register>` followed by the new value on its own line
    SetRegister { register: Register, value: u32 },
    /// `f <start> <end> <value>`: fill a memory range
    Fill { start: u32, end: u32, value: u8 },
    /// `e <address> <bytes>...`
    Enter(Run),
    /// `w`: write CX bytes from 0100 to the named file
    Write,
    /// `q`
    Quit,
}

impl Command {
    /// Name command for a file; dots would be taken as an extension separator
    pub fn name(display_name: &str) -> Self {
        Command::Name(display_name.replace('.', "_"))
    }

    /// Fill command zeroing the whole load segment
    pub fn clear_segment() -> Self {
        Command::Fill {
            start: LOAD_OFFSET,
            end: SEGMENT_END,
            value: 0,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Name(name) => write!(f, "{} {}", CMD_NAME, name),
            Command::SetRegister { register, value } => {
                write!(f, "{} {}\n{:x}", CMD_REGISTER, register, value)
            }
            Command::Fill { start, end, value } => {
                write!(f, "{} {:04x} {:04x} {:02x}", CMD_FILL, start, end, value)
            }
            Command::Enter(run) => fmt::Display::fmt(run, f),
            Command::Write => f.write_str(CMD_WRITE),
            Command::Quit => f.write_str(CMD_QUIT),
        }
    }
}

/// An ordered list of commands that rebuilds a file when replayed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    commands: Vec<Command>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// All `e` runs in emission order
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.commands.iter().filter_map(|cmd| match cmd {
            Command::Enter(run) => Some(run),
            _ => None,
        })
    }

    /// File size announced in the CX register
    pub fn size(&self) -> Option<u32> {
        self.commands.iter().find_map(|cmd| match cmd {
            Command::SetRegister { register: Register::Cx, value } => Some(*value),
            _ => None,
        })
    }

    /// Render the script as newline-terminated debug.exe input
    pub fn render(&self) -> String {
        let mut output = String::new();
        for command in &self.commands {
            output.push_str(&command.to_string());
            output.push('\n');
        }
        output
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
