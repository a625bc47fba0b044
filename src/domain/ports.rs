use crate::domain::model::Service;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Source of truth for the service population.
///
/// Absence is a normal outcome of a lookup and is reported as `None`;
/// turning it into an error is the interactor's job.
#[async_trait]
pub trait Storer: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Option<Service>;

    /// Every stored service in insertion order. The returned vector is a
    /// snapshot owned by the caller.
    async fn get_all(&self) -> Vec<Service>;
}

/// Lazily produces a value associated with an already-resolved parent
/// service. One implementation per association field.
#[async_trait]
pub trait Resolver: Send + Sync {
    type Output: Send;

    async fn resolve(&self, parent: &Service) -> Result<Self::Output>;
}
