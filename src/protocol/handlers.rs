//! Command handlers
//!
//! Each handler answers against one snapshot of the active store, so a
//! reload in the middle of a request never mixes two credential sets.

use crate::auth::{BasicCredentials, CredentialsStore, SharedCredentials};
use crate::protocol::responses::{BAD_REQUEST, DENIED, GOODBYE, GRANTED, format_response};
use crate::protocol::{Command, CommandResult, CommandStatus};
use log::error;
use std::sync::Arc;

/// Dispatches a parsed command to its handler.
pub async fn handle_command(command: Command, credentials: &SharedCredentials) -> CommandResult {
    match command {
        Command::Quit => CommandResult {
            status: CommandStatus::CloseConnection,
            message: format_response(GOODBYE, "Goodbye"),
        },
        Command::Unknown(line) => invalid(&line),
        Command::Check { username, password } => {
            let granted = match credentials.snapshot().await {
                // Nothing to check against when auth is off.
                None => false,
                Some(store) => {
                    let request = BasicCredentials::new(username, password);
                    run_blocking(store, move |store| store.check_request(&request)).await
                }
            };
            verdict(granted)
        }
        Command::Perm { username, perm } => {
            let granted = credentials
                .snapshot()
                .await
                .is_some_and(|store| store.has_perm(&username, &perm));
            verdict(granted)
        }
        Command::AnyPerm { username, perms } => {
            let granted = credentials.snapshot().await.is_some_and(|store| {
                let perms: Vec<&str> = perms.iter().map(String::as_str).collect();
                store.has_any_perm(&username, &perms)
            });
            verdict(granted)
        }
        Command::Aa {
            perm,
            username,
            password,
        } => {
            let granted = match credentials.snapshot().await {
                None => true,
                Some(store) => {
                    let request = match username {
                        Some(username) => BasicCredentials::new(username, password),
                        None => BasicCredentials::anonymous(),
                    };
                    run_blocking(store, move |store| store.aa_request(&request, &perm)).await
                }
            };
            verdict(granted)
        }
    }
}

/// Runs a query that may hit bcrypt off the async workers. A failed task
/// counts as a denial.
async fn run_blocking<F>(store: Arc<CredentialsStore>, query: F) -> bool
where
    F: FnOnce(&CredentialsStore) -> bool + Send + 'static,
{
    match tokio::task::spawn_blocking(move || query(&store)).await {
        Ok(granted) => granted,
        Err(e) => {
            error!("Credential check task failed: {}", e);
            false
        }
    }
}

fn verdict(granted: bool) -> CommandResult {
    if granted {
        CommandResult {
            status: CommandStatus::Granted,
            message: format_response(GRANTED, "Granted"),
        }
    } else {
        CommandResult {
            status: CommandStatus::Denied,
            message: format_response(DENIED, "Denied"),
        }
    }
}

/// Rejects input that never became a command.
pub(crate) fn malformed(reason: &str) -> CommandResult {
    CommandResult {
        status: CommandStatus::Invalid,
        message: format_response(BAD_REQUEST, reason),
    }
}

fn invalid(line: &str) -> CommandResult {
    let message = if line.is_empty() {
        format_response(BAD_REQUEST, "Empty command")
    } else {
        format_response(BAD_REQUEST, "Unknown command or missing arguments")
    };
    CommandResult {
        status: CommandStatus::Invalid,
        message,
    }
}
