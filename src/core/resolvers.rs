use crate::core::interactor::Interactor;
use crate::domain::{CiConfig, Repository, Resolver, Service};
use crate::utils::error::Result;
use async_trait::async_trait;

/// `Service.repo`
#[derive(Debug, Clone)]
pub struct RepoResolver {
    interactor: Interactor,
}

impl RepoResolver {
    pub fn new(interactor: Interactor) -> Self {
        Self { interactor }
    }
}

#[async_trait]
impl Resolver for RepoResolver {
    type Output = Repository;

    async fn resolve(&self, parent: &Service) -> Result<Repository> {
        self.interactor.get_repo(parent).await
    }
}

/// `Service.ci`
#[derive(Debug, Clone)]
pub struct CiResolver {
    interactor: Interactor,
}

impl CiResolver {
    pub fn new(interactor: Interactor) -> Self {
        Self { interactor }
    }
}

#[async_trait]
impl Resolver for CiResolver {
    type Output = CiConfig;

    async fn resolve(&self, parent: &Service) -> Result<CiConfig> {
        self.interactor.get_ci(parent).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStorer;
    use crate::domain::ServiceRecord;
    use std::sync::Arc;

    fn service(id: i64, repo_url: &str) -> Service {
        Service::try_from(ServiceRecord {
            id,
            name: format!("svc-{id}"),
            url: format!("https://svc-{id}.example.com"),
            repo: Repository::new("github").with_url(repo_url),
            ci: CiConfig::new("https://ci.example.com", format!("https://ci.example.com/{id}")),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_resolution_is_per_instance() {
        let seed = vec![
            service(0, "https://github.com/a/zero"),
            service(1, "https://github.com/a/one"),
        ];
        let interactor = Interactor::new(Arc::new(MemoryStorer::new(seed.clone()).unwrap()));
        let repos = RepoResolver::new(interactor.clone());
        let cis = CiResolver::new(interactor);

        for parent in &seed {
            let repo = repos.resolve(parent).await.unwrap();
            assert_eq!(&repo, parent.repo());
            let ci = cis.resolve(parent).await.unwrap();
            assert_eq!(&ci, parent.ci());
        }

        let zero = repos.resolve(&seed[0]).await.unwrap();
        let one = repos.resolve(&seed[1]).await.unwrap();
        assert_eq!(zero.kind, one.kind);
        assert_ne!(zero, one);
    }
}
