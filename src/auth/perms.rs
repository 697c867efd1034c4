//! Permission catalogue
//!
//! Permission names are opaque strings. The store only compares them for
//! equality, so callers are free to use names outside this list.

/// Username that stands for all users, including anonymous requests.
pub const ALL_USERS: &str = "*";

/// Grants every action.
pub const PERM_ALL: &str = "all";
/// Remove a node.
pub const PERM_REMOVE: &str = "remove";
/// Access the execute endpoint.
pub const PERM_EXECUTE: &str = "execute";
/// Access the query endpoint.
pub const PERM_QUERY: &str = "query";
/// Retrieve node status.
pub const PERM_STATUS: &str = "status";
/// Retrieve ready status.
pub const PERM_READY: &str = "ready";
/// Back up a node.
pub const PERM_BACKUP: &str = "backup";
/// Load a dump into a node.
pub const PERM_LOAD: &str = "load";
