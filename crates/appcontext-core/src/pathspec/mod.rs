//! Declarative description of an application's on-disk layout.
//!
//! A [`Layout`](layout::Layout) is a list of [`PathEntry`](entry::PathEntry)
//! values bucketed by base directory.  It can be materialized on disk
//! ([`generate`](layout::Layout::generate)) and compared against what is
//! actually there ([`assess`](layout::Layout::assess)).

pub mod entry;
pub mod layout;
pub mod templates;
pub mod types;
