pub mod interactor;
pub mod resolvers;

pub use crate::domain::{Resolver, Storer};
pub use crate::utils::error::Result;
pub use interactor::Interactor;
pub use resolvers::{CiResolver, RepoResolver};
