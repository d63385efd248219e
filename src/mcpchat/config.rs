//! Configuration for mcpchat.
//!
//! Provides [`ToolCommand`], the parsed form of one `--tool "<command> [arg ...]"`
//! definition, and the [`SessionKey`] derivation used to identify the session it
//! spawns. Users construct everything manually — no file parsing dependencies are
//! required.
//!
//! # Example
//!
//! ```rust
//! use mcpchat::config::ToolCommand;
//!
//! let command: ToolCommand = "uvx mcp-server-time --local-timezone America/Los_Angeles"
//!     .parse()
//!     .unwrap();
//! assert_eq!(command.command, "uvx");
//! assert_eq!(command.args.len(), 3);
//! assert_eq!(
//!     command.session_key(),
//!     "uvx mcp-server-time --local-timezone America/Los_Angeles"
//! );
//! ```

use std::error::Error;
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a session: the command joined with its args by single
/// spaces. Deterministic, so the same definition always maps to the same key.
pub type SessionKey = String;

/// One tool-server launch definition: an executable and its arguments.
///
/// Parsed from a single whitespace-delimited string. There is no quoting or
/// escaping — arguments containing spaces are unsupported and will be mis-split.
/// Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub command: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    /// Derive the [`SessionKey`] identifying the session this command spawns.
    pub fn session_key(&self) -> SessionKey {
        if self.args.is_empty() {
            return self.command.clone();
        }
        format!("{} {}", self.command, self.args.join(" "))
    }
}

/// Error raised when a `--tool` definition contains no command token.
#[derive(Debug, Clone)]
pub struct ParseToolCommandError;

impl fmt::Display for ParseToolCommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tool command definition is empty")
    }
}

impl Error for ParseToolCommandError {}

impl FromStr for ToolCommand {
    type Err = ParseToolCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let command = parts.next().ok_or(ParseToolCommandError)?.to_string();
        Ok(ToolCommand {
            command,
            args: parts.map(str::to_string).collect(),
        })
    }
}
