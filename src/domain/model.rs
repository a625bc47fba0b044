use crate::utils::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};

/// Source-code repository owned by a single [`Service`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Repository {
    /// Repository of the given hosting kind (`github`, `gitlab`, ...) without a URL.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            url: None,
        }
    }

    /// Attaches the repository's browse URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Continuous-integration endpoints owned by a single [`Service`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiConfig {
    pub api: String,
    pub url: String,
}

impl CiConfig {
    pub fn new(api: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            api: api.into(),
            url: url.into(),
        }
    }
}

/// Raw seed record, as found in fixture literals or the `[[services]]`
/// table of the config file. Converted into a [`Service`] through
/// validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub repo: Repository,
    pub ci: CiConfig,
}

/// A monitored service. Fields are private so a `Service` can only exist
/// in a validated state; the repository and CI config are owned values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ServiceRecord", into = "ServiceRecord")]
pub struct Service {
    id: i64,
    name: String,
    url: String,
    repo: Repository,
    ci: CiConfig,
}

impl Service {
    /// Builds a validated service. Fails on a negative id or an empty name or url.
    pub fn new(
        id: i64,
        name: impl Into<String>,
        url: impl Into<String>,
        repo: Repository,
        ci: CiConfig,
    ) -> Result<Self> {
        let name = name.into();
        let url = url.into();

        if id < 0 {
            return Err(CatalogError::InvalidService {
                field: "id".to_string(),
                reason: format!("identifier must be non-negative, got {}", id),
            });
        }
        if name.trim().is_empty() {
            return Err(CatalogError::InvalidService {
                field: "name".to_string(),
                reason: "name cannot be empty".to_string(),
            });
        }
        if url.trim().is_empty() {
            return Err(CatalogError::InvalidService {
                field: "url".to_string(),
                reason: "url cannot be empty".to_string(),
            });
        }

        Ok(Self {
            id,
            name,
            url,
            repo,
            ci,
        })
    }

    /// Unique, non-negative identifier.
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Repository owned by this service.
    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    /// CI endpoints owned by this service.
    pub fn ci(&self) -> &CiConfig {
        &self.ci
    }
}

impl TryFrom<ServiceRecord> for Service {
    type Error = CatalogError;

    fn try_from(record: ServiceRecord) -> Result<Self> {
        Service::new(record.id, record.name, record.url, record.repo, record.ci)
    }
}

impl From<Service> for ServiceRecord {
    fn from(service: Service) -> Self {
        Self {
            id: service.id,
            name: service.name,
            url: service.url,
            repo: service.repo,
            ci: service.ci,
        }
    }
}
