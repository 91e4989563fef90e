//! Random identifier generation.
//!
//! This is the only source of non-determinism in the data model: every
//! factory that needs a fresh id comes through here.

use tracing::debug;
use uuid::Uuid;

const ID_HEX_LEN: usize = 12;

/// Generate a fresh id of the form `<prefix>_<12 hex chars>`.
pub fn new_id(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &hex[..ID_HEX_LEN])
}

/// Generate a fresh id that `taken` reports as unused.
pub fn unique_id(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = new_id(prefix);
        if !taken(&id) {
            return id;
        }
        debug!(id = %id, "generated id already taken, retrying");
    }
}
