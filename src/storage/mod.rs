//! Storage Module
//!
//! Durable page files: the stable state each page reaches once the
//! transaction that wrote it has committed.
//!
//! ## Responsibilities
//! - One file per page id, under a single canonical name
//! - Full overwrite on every flush or redo, never append
//! - Atomic replacement (write temp, fsync, rename)
//!
//! ## File Format
//! ```text
//! page_<id>.page:  LSN,PAYLOAD
//! ```
//! Split at the first comma; the payload may contain further commas.

mod page;
mod page_store;

pub use page::PersistedPage;
pub use page_store::PageStore;
