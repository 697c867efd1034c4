//! Request line parser

use super::commands::Command;

/// Parses a raw request line into a [`Command`].
///
/// Passwords are the remainder of the line after a single separator, taken
/// verbatim apart from the line terminator, so they may contain or start and
/// end with spaces. Known commands with missing arguments parse as `Unknown`.
pub fn parse_command(raw: &str) -> Command {
    let line = raw.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim();
    let (cmd, rest) = split_word(line);

    match cmd.to_ascii_uppercase().as_str() {
        "CHECK" => {
            let (username, password) = split_word(rest);
            if username.is_empty() {
                return Command::Unknown(trimmed.to_string());
            }
            Command::Check {
                username: username.to_string(),
                password: password.to_string(),
            }
        }
        "PERM" => {
            let (username, perm) = split_word(rest);
            let perm = perm.trim();
            if username.is_empty() || perm.is_empty() || perm.contains(char::is_whitespace) {
                return Command::Unknown(trimmed.to_string());
            }
            Command::Perm {
                username: username.to_string(),
                perm: perm.to_string(),
            }
        }
        "ANYPERM" => {
            let (username, perms) = split_word(rest);
            let perms: Vec<String> = perms.split_whitespace().map(str::to_string).collect();
            if username.is_empty() || perms.is_empty() {
                return Command::Unknown(trimmed.to_string());
            }
            Command::AnyPerm {
                username: username.to_string(),
                perms,
            }
        }
        "AA" => {
            let (perm, rest) = split_word(rest);
            if perm.is_empty() {
                return Command::Unknown(trimmed.to_string());
            }
            let (username, password) = split_word(rest);
            Command::Aa {
                perm: perm.to_string(),
                username: (!username.is_empty()).then(|| username.to_string()),
                password: password.to_string(),
            }
        }
        "QUIT" | "Q" if rest.trim().is_empty() => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

/// Splits off the first whitespace-delimited word. Exactly one separator is
/// dropped; the remainder is returned untouched.
fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest),
        None => (input, ""),
    }
}
