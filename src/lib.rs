//! # emx-dbgscript
//!
//! Converts small binary files into scripts for the DOS `debug.exe` memory
//! editor. Feeding the script to `debug.exe` on the target machine rebuilds
//! the original file byte for byte, which makes it possible to move a binary
//! over a channel that only carries text.
//!
//! ## Script Format
//!
//! ```text
//! n test_bin
//! r cx
//! 4
//! f 0100 ffff 00
//! e 101 41 42
//! w
//! q
//! ```
//!
//! - `n` names the output file (dots become underscores)
//! - `r cx` followed by the file length in hex sets the number of bytes `w` writes
//! - `f` zeroes the load segment, so zero bytes never need to be entered
//! - each `e` line enters up to 20 nonzero bytes at their load address
//!   (file offset + `0x100`)
//! - `w` writes the file and `q` exits
//!
//! ## Limits
//!
//! The file is loaded into a single 64K segment starting at `0x100`, so inputs
//! larger than 65280 bytes are rejected with
//! [`EncodeError::SizeLimitExceeded`].
//!
//! ## Trailing Runs
//!
//! The original dbgtool never emitted a run that was still open when the
//! input ended, silently losing trailing nonzero bytes. The default
//! [`TrailingRun::Flush`] policy emits it; [`TrailingRun::Drop`] keeps the
//! old output for consumers that compare scripts verbatim.

pub mod config;
pub mod encoder;
pub mod error;
pub mod script;

pub use config::{OptionKind, OptionValue, Settings};
pub use encoder::{Encoder, TrailingRun};
pub use error::{ConfigError, EncodeError};
pub use script::{Command, Register, Run, Script, MAX_INPUT_SIZE, MAX_RUN_LEN};
