//! Knowledge-base domain model.
//!
//! # Responsibility
//! - Define the records projected from the note tree at query time.
//! - Keep path-derived classification (topic/category) as pure functions.
//!
//! # Invariants
//! - Every record is a snapshot computed per query; nothing here is cached.
//! - Note paths are slash-separated, relative to the vault base, no leading `/`.

pub mod backlog;
pub mod link_graph;
pub mod note;
pub mod topic;
