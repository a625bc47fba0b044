use crate::domain::{Service, Storer};
use crate::utils::error::{CatalogError, Result};
use async_trait::async_trait;
use std::collections::HashMap;

/// In-memory storer built once from seed data and read-only afterwards.
///
/// Services are kept in a vector for insertion-ordered enumeration, with an
/// id -> position index for lookups. Share it behind an `Arc`; no locking is
/// needed since nothing mutates it after construction.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorer {
    services: Vec<Service>,
    index: HashMap<i64, usize>,
}

impl MemoryStorer {
    pub fn new(seed: impl IntoIterator<Item = Service>) -> Result<Self> {
        let mut services = Vec::new();
        let mut index = HashMap::new();

        for service in seed {
            if index.contains_key(&service.id()) {
                return Err(CatalogError::DuplicateServiceId { id: service.id() });
            }
            index.insert(service.id(), services.len());
            services.push(service);
        }

        tracing::debug!(count = services.len(), "Memory storer populated");
        Ok(Self { services, index })
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[async_trait]
impl Storer for MemoryStorer {
    async fn get_by_id(&self, id: i64) -> Option<Service> {
        self.index
            .get(&id)
            .and_then(|&position| self.services.get(position))
            .cloned()
    }

    async fn get_all(&self) -> Vec<Service> {
        self.services.clone()
    }
}
