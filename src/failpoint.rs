//! Failpoints
//!
//! Named switches that make a storage step fail with an I/O error, so tests
//! can drive the error paths of the log and page store. A failpoint is on if
//! it was enabled on the current thread or is listed in the comma-separated
//! `PAGEWAL_FAILPOINTS` environment variable.

use std::cell::RefCell;
use std::collections::HashSet;
use std::io;

/// Fails after a log frame is written but before it is forced to disk
pub const LOG_SYNC: &str = "log.sync";

/// Fails a page write after its temp file is durable, before the rename
pub const PAGE_RENAME: &str = "page.rename";

thread_local! {
    static FAILPOINTS: RefCell<HashSet<String>> = RefCell::new(HashSet::new());
}

pub fn enable(name: &str) {
    FAILPOINTS.with(|set| {
        set.borrow_mut().insert(name.to_string());
    });
}

pub fn disable(name: &str) {
    FAILPOINTS.with(|set| {
        set.borrow_mut().remove(name);
    });
}

pub fn clear() {
    FAILPOINTS.with(|set| set.borrow_mut().clear());
}

pub fn is_enabled(name: &str) -> bool {
    if FAILPOINTS.with(|set| set.borrow().contains(name)) {
        return true;
    }

    std::env::var("PAGEWAL_FAILPOINTS")
        .map(|raw| raw.split(',').any(|v| v.trim() == name))
        .unwrap_or(false)
}

/// Return an error if `name` is enabled
pub fn maybe_fail(name: &str) -> io::Result<()> {
    if is_enabled(name) {
        Err(io::Error::other(format!("failpoint triggered: {name}")))
    } else {
        Ok(())
    }
}
