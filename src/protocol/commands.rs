//! Module `commands`
//!
//! Data structures for the line protocol: one request per line, one
//! response per line.

/// A request parsed from a client line.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Verify a username/password pair.
    Check { username: String, password: String },
    /// Does the user hold the permission? No password check.
    Perm { username: String, perm: String },
    /// Does the user hold any of the permissions? No password check.
    AnyPerm { username: String, perms: Vec<String> },
    /// Authenticate and authorize. `username` is `None` for anonymous callers.
    Aa {
        perm: String,
        username: Option<String>,
        password: String,
    },
    Quit,
    /// Unknown command or missing arguments.
    Unknown(String),
}

/// Outcome of handling a command.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandStatus {
    Granted,
    Denied,
    Invalid,
    CloseConnection,
}

/// Status plus the response line sent back to the client.
#[derive(Debug, PartialEq, Eq)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub message: String,
}
