//! Response handling
//!
//! Defines response codes and formatting.

pub const GRANTED: u16 = 200;
pub const GOODBYE: u16 = 221;
pub const BAD_REQUEST: u16 = 500;
pub const DENIED: u16 = 530;

/// Format a response line
pub fn format_response(code: u16, message: &str) -> String {
    format!("{} {}\r\n", code, message)
}
