//! Query services.
//!
//! # Responsibility
//! - Combine storage, metadata and link capabilities into query results.
//! - Render results as markdown for tool and CLI callers.
//!
//! # Invariants
//! - Services only see a `VaultBackend`; they never name a concrete backend.
//! - Every query degrades to an empty result instead of failing.

pub mod backlog_service;
pub mod context_service;
pub mod recency_service;
pub mod stats_service;
pub mod vault_service;
