use crate::domain::{CiConfig, Repository, Service, Storer};
use crate::utils::error::{CatalogError, Result};
use std::sync::Arc;

/// Use-case layer between the query resolvers and the storer.
///
/// This is where a missing service becomes a [`CatalogError::NotFound`];
/// the storer only ever reports absence.
#[derive(Clone)]
pub struct Interactor {
    storer: Arc<dyn Storer>,
}

impl Interactor {
    pub fn new(storer: Arc<dyn Storer>) -> Self {
        Self { storer }
    }

    pub async fn get_service(&self, id: i64) -> Result<Service> {
        match self.storer.get_by_id(id).await {
            Some(service) => {
                tracing::debug!(id, name = service.name(), "Service resolved");
                Ok(service)
            }
            None => {
                tracing::debug!(id, "Service not found");
                Err(CatalogError::NotFound { id })
            }
        }
    }

    pub async fn get_all_services(&self) -> Result<Vec<Service>> {
        let services = self.storer.get_all().await;
        tracing::debug!(count = services.len(), "Services enumerated");
        Ok(services)
    }

    /// Repository owned by an already-resolved service. Infallible with the
    /// in-memory storer, but backends fetching repositories separately may
    /// return [`CatalogError::AssociationUnavailable`].
    pub async fn get_repo(&self, service: &Service) -> Result<Repository> {
        Ok(service.repo().clone())
    }

    pub async fn get_ci(&self, service: &Service) -> Result<CiConfig> {
        Ok(service.ci().clone())
    }
}

impl std::fmt::Debug for Interactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interactor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{fixtures::default_services, MemoryStorer};
    use tokio_test::{assert_err, assert_ok};

    fn interactor() -> Interactor {
        Interactor::new(Arc::new(MemoryStorer::new(default_services().unwrap()).unwrap()))
    }

    #[tokio::test]
    async fn test_get_service_found() {
        let interactor = interactor();

        let service = assert_ok!(interactor.get_service(0).await);
        assert_eq!(service.name(), "goploader");
        assert_eq!(service.url(), "https://gpldr.in");
    }

    #[tokio::test]
    async fn test_get_service_not_found_carries_id() {
        let interactor = interactor();

        let err = assert_err!(interactor.get_service(2).await);
        assert!(matches!(err, CatalogError::NotFound { id: 2 }));
    }

    #[tokio::test]
    async fn test_get_all_services_in_seed_order() {
        let interactor = interactor();

        let names: Vec<String> = assert_ok!(interactor.get_all_services().await)
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, vec!["goploader", "gomonit"]);
    }

    #[tokio::test]
    async fn test_get_repo_is_scoped_to_parent() {
        let interactor = interactor();
        let goploader = interactor.get_service(0).await.unwrap();
        let gomonit = interactor.get_service(1).await.unwrap();

        let repo = assert_ok!(interactor.get_repo(&goploader).await);
        assert_eq!(repo, Repository::new("github"));

        let ci = assert_ok!(interactor.get_ci(&gomonit).await);
        assert_eq!(ci.url, "https://drone.depado.eu/Depado/gomonit");
    }

    #[tokio::test]
    async fn test_repeated_lookups_are_identical() {
        let interactor = interactor();

        let first = interactor.get_all_services().await.unwrap();
        let second = interactor.get_all_services().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            interactor.get_service(1).await.unwrap(),
            interactor.get_service(1).await.unwrap()
        );
    }
}
