use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("service {id} not found")]
    NotFound { id: i64 },

    #[error("{association} unavailable for service {service_id}")]
    AssociationUnavailable {
        service_id: i64,
        association: String,
    },

    #[error("duplicate service id {id} in seed data")]
    DuplicateServiceId { id: i64 },

    #[error("invalid service field '{field}': {reason}")]
    InvalidService { field: String, reason: String },

    #[error("syntax error at position {position}: {message}")]
    QuerySyntax { position: usize, message: String },

    #[error("cannot query field '{field}' on type '{type_name}'")]
    UnknownField { type_name: String, field: String },

    #[error("field '{field}' requires argument '{argument}'")]
    MissingArgument { field: String, argument: String },

    #[error("invalid argument '{argument}' on field '{field}': {reason}")]
    InvalidArgument {
        field: String,
        argument: String,
        reason: String,
    },

    #[error("invalid selection on field '{field}': {reason}")]
    InvalidSelection { field: String, reason: String },

    #[error("variable '${name}' is not defined")]
    UnknownVariable { name: String },

    #[error("variable '${name}' is never used")]
    UnusedVariable { name: String },

    #[error("unknown operation named '{name}'")]
    UnknownOperation { name: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid config value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Server error: {message}")]
    ServerError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Domain,
    Query,
    Configuration,
    System,
}

impl CatalogError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CatalogError::NotFound { .. }
            | CatalogError::AssociationUnavailable { .. }
            | CatalogError::DuplicateServiceId { .. }
            | CatalogError::InvalidService { .. } => ErrorCategory::Domain,
            CatalogError::QuerySyntax { .. }
            | CatalogError::UnknownField { .. }
            | CatalogError::MissingArgument { .. }
            | CatalogError::InvalidArgument { .. }
            | CatalogError::InvalidSelection { .. }
            | CatalogError::UnknownVariable { .. }
            | CatalogError::UnusedVariable { .. }
            | CatalogError::UnknownOperation { .. } => ErrorCategory::Query,
            CatalogError::ConfigError { .. }
            | CatalogError::InvalidConfigValueError { .. }
            | CatalogError::TomlError(_) => ErrorCategory::Configuration,
            CatalogError::ServerError { .. }
            | CatalogError::IoError(_)
            | CatalogError::SerializationError(_) => ErrorCategory::System,
        }
    }

    /// Stable machine-readable code, rendered into `extensions.code` of a
    /// query response.
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::NotFound { .. } => "NOT_FOUND",
            CatalogError::AssociationUnavailable { .. } => "ASSOCIATION_UNAVAILABLE",
            CatalogError::DuplicateServiceId { .. } => "DUPLICATE_SERVICE_ID",
            CatalogError::InvalidService { .. } => "INVALID_SERVICE",
            CatalogError::QuerySyntax { .. } => "GRAPHQL_PARSE_FAILED",
            CatalogError::UnknownField { .. }
            | CatalogError::MissingArgument { .. }
            | CatalogError::InvalidArgument { .. }
            | CatalogError::InvalidSelection { .. }
            | CatalogError::UnknownVariable { .. }
            | CatalogError::UnusedVariable { .. }
            | CatalogError::UnknownOperation { .. } => "GRAPHQL_VALIDATION_FAILED",
            CatalogError::ConfigError { .. }
            | CatalogError::InvalidConfigValueError { .. }
            | CatalogError::TomlError(_) => "CONFIGURATION_ERROR",
            CatalogError::ServerError { .. }
            | CatalogError::IoError(_)
            | CatalogError::SerializationError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Domain => "Check the requested identifier against the `services` query",
            ErrorCategory::Query => "Fix the query document and send it again",
            ErrorCategory::Configuration => "Check the configuration file and command-line flags",
            ErrorCategory::System => "Check the server logs for details",
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
