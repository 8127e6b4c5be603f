//! Backend selection.
//!
//! Exactly one backend is chosen at startup and handed to query services as
//! a bundle of capability trait objects. Services never name a concrete
//! backend type.

use super::fs_store::{FsMetadata, FsStorage};
use super::host_store::HostVault;
use super::link_index::ScannedLinkGraph;
use super::{FileStorage, LinkGraphAccessor, MetadataProvider};
use std::fmt::{Debug, Formatter};
use std::path::PathBuf;
use std::sync::Arc;

/// Which data source backs the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Raw filesystem, no link graph.
    Filesystem,
    /// Raw filesystem with a link graph rescanned per query.
    FilesystemScanned,
    /// Host application snapshot with its own metadata cache.
    Host,
}

/// Capability bundle consumed by query services.
#[derive(Clone)]
pub struct VaultBackend {
    kind: BackendKind,
    storage: Arc<dyn FileStorage>,
    metadata: Arc<dyn MetadataProvider>,
    links: Arc<dyn LinkGraphAccessor>,
}

impl VaultBackend {
    /// Filesystem backend rooted at `base_path`; link queries return empty maps.
    pub fn filesystem(base_path: impl Into<PathBuf>) -> Self {
        let storage = FsStorage::new(base_path);
        let metadata = Arc::new(FsMetadata::new(storage.clone()));
        Self {
            kind: BackendKind::Filesystem,
            storage: Arc::new(storage),
            metadata: metadata.clone(),
            links: metadata,
        }
    }

    /// Filesystem backend whose link graph is computed by scanning all notes.
    pub fn filesystem_scanned(base_path: impl Into<PathBuf>) -> Self {
        let storage = FsStorage::new(base_path);
        let metadata = Arc::new(FsMetadata::new(storage.clone()));
        let storage: Arc<dyn FileStorage> = Arc::new(storage);
        Self {
            kind: BackendKind::FilesystemScanned,
            links: Arc::new(ScannedLinkGraph::new(storage.clone())),
            storage,
            metadata,
        }
    }

    /// Host-supplied backend sharing the given snapshot.
    pub fn host(vault: Arc<HostVault>) -> Self {
        Self {
            kind: BackendKind::Host,
            storage: vault.clone(),
            metadata: vault.clone(),
            links: vault,
        }
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn storage(&self) -> &dyn FileStorage {
        self.storage.as_ref()
    }

    pub fn metadata(&self) -> &dyn MetadataProvider {
        self.metadata.as_ref()
    }

    pub fn links(&self) -> &dyn LinkGraphAccessor {
        self.links.as_ref()
    }
}

impl Debug for VaultBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultBackend")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
