// Domain layer: entity model and ports. No knowledge of storage or transport.

pub mod model;
pub mod ports;

pub use model::{CiConfig, Repository, Service, ServiceRecord};
pub use ports::{Resolver, Storer};
