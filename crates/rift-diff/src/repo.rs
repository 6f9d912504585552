//! The repository handle a change list carries: where stored content lives,
//! where the working tree is rooted, and how path attributes are looked up.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rift_store::{Blob, ObjectStore};
use rift_types::ObjectId;

use crate::attr::{AttrValue, AttributeLookup, NoAttributes};
use crate::error::DiffResult;

/// Cheaply clonable handle to the collaborators the diff core consumes.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn ObjectStore>,
    workdir: Option<PathBuf>,
    attributes: Arc<dyn AttributeLookup>,
}

impl Repository {
    /// A repository with no working directory and no attribute rules.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            workdir: None,
            attributes: Arc::new(NoAttributes),
        }
    }

    pub fn with_workdir(mut self, root: impl Into<PathBuf>) -> Self {
        self.workdir = Some(root.into());
        self
    }

    pub fn with_attributes(mut self, attributes: Arc<dyn AttributeLookup>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }

    pub fn attribute(&self, path: &str, name: &str) -> DiffResult<AttrValue> {
        self.attributes.get(path, name)
    }

    /// The identifier `data` would be stored under as a blob.
    pub fn hash_content(&self, data: &[u8]) -> ObjectId {
        Blob::id_for(data)
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("workdir", &self.workdir)
            .finish_non_exhaustive()
    }
}
