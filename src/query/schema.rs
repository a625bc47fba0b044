use crate::core::{CiResolver, Interactor, RepoResolver};
use crate::domain::{CiConfig, Repository, Resolver};
use crate::query::executor::{self, Request, Response};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;

pub const QUERY_TYPE: &str = "Query";
pub const SERVICE_TYPE: &str = "Service";
pub const REPOSITORY_TYPE: &str = "Repository";
pub const CI_TYPE: &str = "CIConfig";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Named(&'static str),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn non_null(self) -> Self {
        TypeRef::NonNull(Box::new(self))
    }

    pub fn list_of(self) -> Self {
        TypeRef::List(Box::new(self))
    }

    /// Innermost named type, stripping list and non-null wrappers.
    pub fn named(&self) -> &'static str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.named(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

fn named(name: &'static str) -> TypeRef {
    TypeRef::Named(name)
}

#[derive(Debug, Clone)]
pub struct ArgumentDef {
    pub name: &'static str,
    pub ty: TypeRef,
}

#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: &'static str,
    pub description: &'static str,
    pub ty: TypeRef,
    pub arguments: Vec<ArgumentDef>,
}

impl FieldDef {
    fn new(name: &'static str, description: &'static str, ty: TypeRef) -> Self {
        Self {
            name,
            description,
            ty,
            arguments: Vec::new(),
        }
    }

    fn with_argument(mut self, name: &'static str, ty: TypeRef) -> Self {
        self.arguments.push(ArgumentDef { name, ty });
        self
    }

    pub fn argument(&self, name: &str) -> Option<&ArgumentDef> {
        self.arguments.iter().find(|arg| arg.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct ObjectType {
    pub name: &'static str,
    pub description: &'static str,
    pub fields: Vec<FieldDef>,
}

impl ObjectType {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Immutable schema: type definitions plus the resolvers bound to them.
/// Built once at start-up and shared by reference with the serving layer.
pub struct Schema {
    types: Vec<ObjectType>,
    pub(crate) interactor: Interactor,
    pub(crate) repo_resolver: Arc<dyn Resolver<Output = Repository>>,
    pub(crate) ci_resolver: Arc<dyn Resolver<Output = CiConfig>>,
}

impl Schema {
    pub fn builder(interactor: Interactor) -> SchemaBuilder {
        SchemaBuilder::new(interactor)
    }

    pub fn object(&self, name: &str) -> Option<&ObjectType> {
        self.types.iter().find(|ty| ty.name == name)
    }

    pub fn query_type(&self) -> &ObjectType {
        // build() always registers the query root first
        &self.types[0]
    }

    pub fn types(&self) -> &[ObjectType] {
        &self.types
    }

    pub async fn execute(&self, request: &Request) -> Response {
        executor::execute(self, request).await
    }

    /// JSON description of every type, field and argument, as written by the
    /// `schema` command.
    pub fn to_json(&self) -> Value {
        let types: Vec<Value> = self
            .types
            .iter()
            .map(|ty| {
                let fields: Vec<Value> = ty
                    .fields
                    .iter()
                    .map(|field| {
                        let args: Vec<Value> = field
                            .arguments
                            .iter()
                            .map(|arg| json!({"name": arg.name, "type": arg.ty.to_string()}))
                            .collect();
                        json!({
                            "name": field.name,
                            "description": field.description,
                            "type": field.ty.to_string(),
                            "args": args,
                        })
                    })
                    .collect();
                json!({
                    "kind": "OBJECT",
                    "name": ty.name,
                    "description": ty.description,
                    "fields": fields,
                })
            })
            .collect();

        json!({
            "queryType": QUERY_TYPE,
            "types": types,
        })
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("types", &self.types)
            .finish_non_exhaustive()
    }
}

/// Binds the catalog's object types to an interactor. Association resolvers
/// default to the interactor-backed ones and can be swapped individually.
pub struct SchemaBuilder {
    interactor: Interactor,
    repo_resolver: Option<Arc<dyn Resolver<Output = Repository>>>,
    ci_resolver: Option<Arc<dyn Resolver<Output = CiConfig>>>,
}

impl SchemaBuilder {
    pub fn new(interactor: Interactor) -> Self {
        Self {
            interactor,
            repo_resolver: None,
            ci_resolver: None,
        }
    }

    pub fn repo_resolver(mut self, resolver: Arc<dyn Resolver<Output = Repository>>) -> Self {
        self.repo_resolver = Some(resolver);
        self
    }

    pub fn ci_resolver(mut self, resolver: Arc<dyn Resolver<Output = CiConfig>>) -> Self {
        self.ci_resolver = Some(resolver);
        self
    }

    pub fn build(self) -> Schema {
        let query = ObjectType {
            name: QUERY_TYPE,
            description: "Root read operations of the catalog",
            fields: vec![
                FieldDef::new(
                    "service",
                    "A single service by identifier",
                    named(SERVICE_TYPE).non_null(),
                )
                .with_argument("id", named("Int").non_null()),
                FieldDef::new(
                    "services",
                    "Every service, in registration order",
                    named(SERVICE_TYPE).non_null().list_of().non_null(),
                ),
            ],
        };

        let service = ObjectType {
            name: SERVICE_TYPE,
            description: "A type that describes a single service",
            fields: vec![
                FieldDef::new("id", "Unique identifier", named("Int").non_null()),
                FieldDef::new("name", "Service name", named("String").non_null()),
                FieldDef::new("url", "Public URL of the service", named("String").non_null()),
                FieldDef::new(
                    "repo",
                    "Source-code repository, resolved on demand",
                    named(REPOSITORY_TYPE).non_null(),
                ),
                FieldDef::new(
                    "ci",
                    "Continuous-integration endpoints, resolved on demand",
                    named(CI_TYPE).non_null(),
                ),
            ],
        };

        let repository = ObjectType {
            name: REPOSITORY_TYPE,
            description: "Source-code repository of a service",
            fields: vec![
                FieldDef::new("type", "Hosting kind, e.g. github", named("String").non_null()),
                FieldDef::new("url", "Repository URL, when known", named("String")),
            ],
        };

        let ci = ObjectType {
            name: CI_TYPE,
            description: "Continuous-integration endpoints of a service",
            fields: vec![
                FieldDef::new("api", "CI API endpoint", named("String").non_null()),
                FieldDef::new("url", "CI dashboard URL", named("String").non_null()),
            ],
        };

        let repo_resolver: Arc<dyn Resolver<Output = Repository>> = match self.repo_resolver {
            Some(resolver) => resolver,
            None => Arc::new(RepoResolver::new(self.interactor.clone())),
        };
        let ci_resolver: Arc<dyn Resolver<Output = CiConfig>> = match self.ci_resolver {
            Some(resolver) => resolver,
            None => Arc::new(CiResolver::new(self.interactor.clone())),
        };

        Schema {
            types: vec![query, service, repository, ci],
            interactor: self.interactor,
            repo_resolver,
            ci_resolver,
        }
    }
}
