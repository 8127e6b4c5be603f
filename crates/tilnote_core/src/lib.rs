//! Core indexing and query logic for a markdown TIL vault.
//! Storage backends, markdown extraction and query services live here;
//! hosts and the CLI only wire them together.

pub mod config;
pub mod logging;
pub mod markdown;
pub mod model;
pub mod service;
pub mod store;

pub use config::{load_config, KnowledgeBaseConfig, TilRoot};
pub use logging::{default_log_level, init_logging, logging_status};
pub use markdown::extract_metadata;
pub use model::backlog::{BacklogCategoryStatus, BacklogItem, BacklogProgress, BacklogSection};
pub use model::link_graph::{LinkGraph, LinkMap};
pub use model::note::{FileEntry, Frontmatter, NoteMetadata};
pub use model::topic::{extract_category, extract_topic, Topic};
pub use service::backlog_service::BacklogService;
pub use service::context_service::ContextService;
pub use service::recency_service::RecencyService;
pub use service::stats_service::StatsService;
pub use service::vault_service::VaultService;
pub use store::backend::{BackendKind, VaultBackend};
pub use store::host_store::HostVault;
pub use store::{FileStorage, LinkGraphAccessor, MetadataProvider, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
