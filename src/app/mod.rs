use crate::adapters::MemoryStorer;
use crate::core::Interactor;
use crate::domain::Service;
use crate::query::Schema;
use crate::utils::error::Result;
use std::sync::Arc;

/// Wires storer, interactor and resolvers into a ready-to-serve schema.
pub fn build_schema(seed: impl IntoIterator<Item = Service>) -> Result<Schema> {
    let storer = MemoryStorer::new(seed)?;
    tracing::info!(services = storer.len(), "Catalog loaded");

    let interactor = Interactor::new(Arc::new(storer));
    Ok(Schema::builder(interactor).build())
}
