//! Swappable talent catalog snapshot
//!
//! The catalog is replaced wholesale whenever the bot re-syncs its talent
//! sheet. Readers clone the current `Arc` under a short read lock and work
//! on that snapshot without holding any lock, so a reload never tears an
//! in-flight validation.

use crate::catalog::TalentCatalog;
use crate::error::{GuildError, Result};
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct CatalogStore {
    current: RwLock<Option<Arc<TalentCatalog>>>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current catalog, or `CatalogNotInitialized` before the first load
    #[inline]
    pub fn snapshot(&self) -> Result<Arc<TalentCatalog>> {
        let current = self.current.read().clone();
        current.ok_or(GuildError::CatalogNotInitialized)
    }

    /// Swap in a new catalog, returning the talent count of the one it replaced
    pub fn replace(&self, catalog: TalentCatalog) -> Option<usize> {
        let next = Arc::new(catalog);
        let previous = {
            let mut guard = self.current.write();
            guard.replace(next)
        };
        previous.map(|old| old.talent_count())
    }

    pub fn is_initialized(&self) -> bool {
        self.current.read().is_some()
    }
}
