pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod query;
pub mod server;
pub mod utils;

pub use adapters::MemoryStorer;
pub use app::build_schema;
pub use config::CatalogConfig;
pub use crate::core::Interactor;
pub use domain::{CiConfig, Repository, Service};
pub use query::{Request, Response, Schema};
pub use utils::error::{CatalogError, Result};
