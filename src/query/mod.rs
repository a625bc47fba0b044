//! Query resolution layer: the declared schema, the query parser and the
//! executor binding fields to interactor operations.

pub mod executor;
pub mod parser;
pub mod schema;

pub use executor::{GraphQLError, PathSegment, Request, Response};
pub use schema::{Schema, SchemaBuilder};
