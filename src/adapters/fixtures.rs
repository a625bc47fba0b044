use crate::domain::{CiConfig, Repository, Service, ServiceRecord};
use crate::utils::error::Result;

fn record(id: i64, name: &str, url: &str) -> ServiceRecord {
    ServiceRecord {
        id,
        name: name.to_string(),
        url: url.to_string(),
        repo: Repository::new("github"),
        ci: CiConfig::new(
            "https://drone.depado.eu",
            format!("https://drone.depado.eu/Depado/{name}"),
        ),
    }
}

/// Built-in seed population used when the config file declares no services.
pub fn default_records() -> Vec<ServiceRecord> {
    vec![
        record(0, "goploader", "https://gpldr.in"),
        record(1, "gomonit", "https://monit.depado.eu"),
    ]
}

/// Validates raw records into services, stopping at the first invalid one.
pub fn services_from_records(records: Vec<ServiceRecord>) -> Result<Vec<Service>> {
    records.into_iter().map(Service::try_from).collect()
}

pub fn default_services() -> Result<Vec<Service>> {
    services_from_records(default_records())
}
