use crate::domain::{CiConfig, Repository, Service};
use crate::query::parser::{parse_document, Document, Field, InputValue};
use crate::query::schema::{
    ObjectType, Schema, TypeRef, CI_TYPE, QUERY_TYPE, REPOSITORY_TYPE, SERVICE_TYPE,
};
use crate::utils::error::{CatalogError, Result};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

const TYPENAME: &str = "__typename";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub query: String,
    #[serde(default)]
    pub variables: Option<Map<String, Value>>,
    #[serde(default)]
    pub operation_name: Option<String>,
}

impl Request {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathSegment>,
    pub extensions: Map<String, Value>,
}

impl GraphQLError {
    pub fn new(error: &CatalogError, path: Vec<PathSegment>) -> Self {
        let mut extensions = Map::new();
        extensions.insert("code".to_string(), json!(error.code()));
        match error {
            CatalogError::NotFound { id } => {
                extensions.insert("id".to_string(), json!(id));
            }
            CatalogError::AssociationUnavailable { service_id, .. } => {
                extensions.insert("serviceId".to_string(), json!(service_id));
            }
            CatalogError::QuerySyntax { position, .. } => {
                extensions.insert("position".to_string(), json!(position));
            }
            _ => {}
        }

        Self {
            message: error.to_string(),
            path,
            extensions,
        }
    }

    pub fn code(&self) -> Option<&str> {
        self.extensions.get("code").and_then(Value::as_str)
    }
}

/// Outcome of a query. A failing resolver aborts the whole request, so
/// `data` is `None` whenever `errors` is non-empty.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,
}

impl Response {
    fn from_error(error: &CatalogError, path: Vec<PathSegment>) -> Self {
        Self {
            data: None,
            errors: vec![GraphQLError::new(error, path)],
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

struct ExecutionError {
    error: CatalogError,
    path: Vec<PathSegment>,
}

fn at(error: CatalogError, path: &[PathSegment]) -> ExecutionError {
    ExecutionError {
        error,
        path: path.to_vec(),
    }
}

struct Context<'a> {
    schema: &'a Schema,
    document: &'a Document,
    variables: &'a Map<String, Value>,
}

pub async fn execute(schema: &Schema, request: &Request) -> Response {
    let mut document = match parse_document(&request.query) {
        Ok(document) => document,
        Err(e) => {
            tracing::debug!(error = %e, "Query rejected by parser");
            return Response::from_error(&e, Vec::new());
        }
    };

    if let Some(requested) = &request.operation_name {
        if document.operation_name.as_ref() != Some(requested) {
            let e = CatalogError::UnknownOperation {
                name: requested.clone(),
            };
            return Response::from_error(&e, Vec::new());
        }
    }

    document.selection_set = match merge_selection(std::mem::take(&mut document.selection_set)) {
        Ok(fields) => fields,
        Err(e) => {
            tracing::debug!(error = %e, "Query rejected by validation");
            return Response::from_error(&e, Vec::new());
        }
    };

    let variables = request.variables.clone().unwrap_or_default();
    if let Err(e) = validate(schema, &document, &variables) {
        tracing::debug!(error = %e, "Query rejected by validation");
        return Response::from_error(&e, Vec::new());
    }

    tracing::debug!(
        operation = document.operation_name.as_deref().unwrap_or("<anonymous>"),
        root_fields = document.selection_set.len(),
        "Executing query"
    );

    let ctx = Context {
        schema,
        document: &document,
        variables: &variables,
    };

    match resolve_root(&ctx).await {
        Ok(data) => Response {
            data: Some(data),
            errors: Vec::new(),
        },
        Err(ExecutionError { error, path }) => {
            tracing::debug!(error = %error, code = error.code(), "Query resolution failed");
            Response::from_error(&error, path)
        }
    }
}

/// Folds fields sharing a response key into one, concatenating their
/// subselections. Fields under the same key must name the same field with
/// the same arguments.
fn merge_selection(fields: Vec<Field>) -> Result<Vec<Field>> {
    let mut merged: Vec<Field> = Vec::new();

    for field in fields {
        match merged
            .iter_mut()
            .find(|seen| seen.response_key() == field.response_key())
        {
            Some(seen) => {
                if seen.name != field.name || !same_arguments(&seen.arguments, &field.arguments) {
                    return Err(CatalogError::InvalidSelection {
                        field: field.response_key().to_string(),
                        reason: format!(
                            "'{}' and '{}' conflict, they use different fields or arguments",
                            seen.name, field.name
                        ),
                    });
                }
                seen.selection_set.extend(field.selection_set);
            }
            None => merged.push(field),
        }
    }

    merged
        .into_iter()
        .map(|mut field| {
            field.selection_set = merge_selection(std::mem::take(&mut field.selection_set))?;
            Ok(field)
        })
        .collect()
}

fn same_arguments(left: &[(String, InputValue)], right: &[(String, InputValue)]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .all(|(name, value)| right.iter().any(|(other, v)| other == name && v == value))
}

fn collect_variables<'a>(value: &'a InputValue, used: &mut Vec<&'a str>) {
    match value {
        InputValue::Variable(name) => used.push(name),
        InputValue::List(items) => items.iter().for_each(|item| collect_variables(item, used)),
        InputValue::Object(entries) => entries
            .iter()
            .for_each(|(_, value)| collect_variables(value, used)),
        _ => {}
    }
}

fn collect_used_variables<'a>(fields: &'a [Field], used: &mut Vec<&'a str>) {
    for field in fields {
        for (_, value) in &field.arguments {
            collect_variables(value, used);
        }
        collect_used_variables(&field.selection_set, used);
    }
}

/// A variable fits an argument when its declared type is the argument's type,
/// or the nullable form of it (a null value then fails at coercion).
fn variable_fits(declared: &str, expected: &TypeRef) -> bool {
    declared == expected.to_string()
        || matches!(expected, TypeRef::NonNull(inner) if declared == inner.to_string())
}

fn validate(schema: &Schema, document: &Document, variables: &Map<String, Value>) -> Result<()> {
    for definition in &document.variable_definitions {
        let required = definition.type_name.ends_with('!') && definition.default_value.is_none();
        if required && variables.get(&definition.name).map_or(true, Value::is_null) {
            return Err(CatalogError::UnknownVariable {
                name: definition.name.clone(),
            });
        }
    }

    let mut used = Vec::new();
    collect_used_variables(&document.selection_set, &mut used);
    if let Some(name) = used.iter().find(|name| document.variable(name).is_none()) {
        return Err(CatalogError::UnknownVariable {
            name: name.to_string(),
        });
    }
    if let Some(unused) = document
        .variable_definitions
        .iter()
        .find(|definition| !used.contains(&definition.name.as_str()))
    {
        return Err(CatalogError::UnusedVariable {
            name: unused.name.clone(),
        });
    }

    validate_selection(schema, schema.query_type(), &document.selection_set, document)
}

fn validate_selection(
    schema: &Schema,
    object: &ObjectType,
    fields: &[Field],
    document: &Document,
) -> Result<()> {
    for field in fields {
        if field.name == TYPENAME {
            if !field.selection_set.is_empty() {
                return Err(CatalogError::InvalidSelection {
                    field: field.name.clone(),
                    reason: "scalar fields cannot have a selection".to_string(),
                });
            }
            continue;
        }

        let definition = object
            .field(&field.name)
            .ok_or_else(|| CatalogError::UnknownField {
                type_name: object.name.to_string(),
                field: field.name.clone(),
            })?;

        for (argument, value) in &field.arguments {
            let argument_def =
                definition
                    .argument(argument)
                    .ok_or_else(|| CatalogError::InvalidArgument {
                        field: field.name.clone(),
                        argument: argument.clone(),
                        reason: "unknown argument".to_string(),
                    })?;
            if let InputValue::Variable(name) = value {
                let variable = document
                    .variable(name)
                    .ok_or_else(|| CatalogError::UnknownVariable { name: name.clone() })?;
                if !variable_fits(&variable.type_name, &argument_def.ty) {
                    return Err(CatalogError::InvalidArgument {
                        field: field.name.clone(),
                        argument: argument.clone(),
                        reason: format!(
                            "variable '${}' of type '{}' used where '{}' is expected",
                            name, variable.type_name, argument_def.ty
                        ),
                    });
                }
            }
        }

        for argument in &definition.arguments {
            if argument.ty.is_non_null() && field.argument(argument.name).is_none() {
                return Err(CatalogError::MissingArgument {
                    field: field.name.clone(),
                    argument: argument.name.to_string(),
                });
            }
        }

        match schema.object(definition.ty.named()) {
            Some(child) if field.selection_set.is_empty() => {
                return Err(CatalogError::InvalidSelection {
                    field: field.name.clone(),
                    reason: format!("type '{}' must have a selection of subfields", child.name),
                });
            }
            Some(child) => validate_selection(schema, child, &field.selection_set, document)?,
            None if !field.selection_set.is_empty() => {
                return Err(CatalogError::InvalidSelection {
                    field: field.name.clone(),
                    reason: "scalar fields cannot have a selection".to_string(),
                });
            }
            None => {}
        }
    }

    Ok(())
}

fn constant_to_json(value: &InputValue) -> Value {
    match value {
        InputValue::Int(i) => json!(i),
        InputValue::Float(f) => json!(f),
        InputValue::String(s) | InputValue::Enum(s) => json!(s),
        InputValue::Boolean(b) => json!(b),
        InputValue::Null | InputValue::Variable(_) => Value::Null,
        InputValue::List(items) => Value::Array(items.iter().map(constant_to_json).collect()),
        InputValue::Object(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), constant_to_json(value)))
                .collect(),
        ),
    }
}

impl Context<'_> {
    fn variable_value(&self, name: &str) -> Value {
        self.variables
            .get(name)
            .cloned()
            .or_else(|| {
                self.document
                    .variable(name)
                    .and_then(|definition| definition.default_value.as_ref())
                    .map(constant_to_json)
            })
            .unwrap_or(Value::Null)
    }

    fn int_argument(&self, field: &Field, argument: &str) -> Result<i64> {
        let invalid = |reason: &str| CatalogError::InvalidArgument {
            field: field.name.clone(),
            argument: argument.to_string(),
            reason: reason.to_string(),
        };

        let value = match field.argument(argument) {
            Some(InputValue::Variable(name)) => self.variable_value(name),
            Some(literal) => constant_to_json(literal),
            None => {
                return Err(CatalogError::MissingArgument {
                    field: field.name.clone(),
                    argument: argument.to_string(),
                })
            }
        };

        match value {
            Value::Null => Err(invalid("expected Int, found null")),
            Value::Number(n) => n.as_i64().ok_or_else(|| invalid("expected Int")),
            _ => Err(invalid("expected Int")),
        }
    }
}

async fn resolve_root(ctx: &Context<'_>) -> std::result::Result<Value, ExecutionError> {
    let entries = try_join_all(
        ctx.document
            .selection_set
            .iter()
            .map(|field| resolve_query_field(ctx, field)),
    )
    .await?;

    Ok(Value::Object(entries.into_iter().collect()))
}

async fn resolve_query_field(
    ctx: &Context<'_>,
    field: &Field,
) -> std::result::Result<(String, Value), ExecutionError> {
    let key = field.response_key().to_string();
    let path = vec![PathSegment::Key(key.clone())];
    let interactor = &ctx.schema.interactor;

    let value = match field.name.as_str() {
        TYPENAME => json!(QUERY_TYPE),
        "service" => {
            let id = ctx.int_argument(field, "id").map_err(|e| at(e, &path))?;
            let service = interactor.get_service(id).await.map_err(|e| at(e, &path))?;
            resolve_service(ctx, &service, &field.selection_set, &path).await?
        }
        "services" => {
            let services = interactor.get_all_services().await.map_err(|e| at(e, &path))?;
            let items = try_join_all(services.iter().enumerate().map(|(index, service)| {
                let mut item_path = path.clone();
                item_path.push(PathSegment::Index(index));
                async move { resolve_service(ctx, service, &field.selection_set, &item_path).await }
            }))
            .await?;
            Value::Array(items)
        }
        other => {
            let e = CatalogError::UnknownField {
                type_name: QUERY_TYPE.to_string(),
                field: other.to_string(),
            };
            return Err(at(e, &path));
        }
    };

    Ok((key, value))
}

async fn resolve_service(
    ctx: &Context<'_>,
    service: &Service,
    selection: &[Field],
    path: &[PathSegment],
) -> std::result::Result<Value, ExecutionError> {
    let entries = try_join_all(
        selection
            .iter()
            .map(|field| resolve_service_field(ctx, service, field, path)),
    )
    .await?;

    Ok(Value::Object(entries.into_iter().collect()))
}

/// Scalar fields are read off the resolved service; `repo` and `ci` go
/// through their resolvers only when selected.
async fn resolve_service_field(
    ctx: &Context<'_>,
    service: &Service,
    field: &Field,
    parent_path: &[PathSegment],
) -> std::result::Result<(String, Value), ExecutionError> {
    let key = field.response_key().to_string();
    let mut path = parent_path.to_vec();
    path.push(PathSegment::Key(key.clone()));

    let value = match field.name.as_str() {
        TYPENAME => json!(SERVICE_TYPE),
        "id" => json!(service.id()),
        "name" => json!(service.name()),
        "url" => json!(service.url()),
        "repo" => {
            let repo = ctx
                .schema
                .repo_resolver
                .resolve(service)
                .await
                .map_err(|e| at(e, &path))?;
            project_repository(&repo, &field.selection_set)
        }
        "ci" => {
            let ci = ctx
                .schema
                .ci_resolver
                .resolve(service)
                .await
                .map_err(|e| at(e, &path))?;
            project_ci(&ci, &field.selection_set)
        }
        other => {
            let e = CatalogError::UnknownField {
                type_name: SERVICE_TYPE.to_string(),
                field: other.to_string(),
            };
            return Err(at(e, &path));
        }
    };

    Ok((key, value))
}

// Unknown subfields never reach the projections, validation rejects them.
fn project_repository(repo: &Repository, selection: &[Field]) -> Value {
    let object: Map<String, Value> = selection
        .iter()
        .map(|field| {
            let value = match field.name.as_str() {
                TYPENAME => json!(REPOSITORY_TYPE),
                "type" => json!(repo.kind),
                "url" => json!(repo.url),
                _ => Value::Null,
            };
            (field.response_key().to_string(), value)
        })
        .collect();
    Value::Object(object)
}

fn project_ci(ci: &CiConfig, selection: &[Field]) -> Value {
    let object: Map<String, Value> = selection
        .iter()
        .map(|field| {
            let value = match field.name.as_str() {
                TYPENAME => json!(CI_TYPE),
                "api" => json!(ci.api),
                "url" => json!(ci.url),
                _ => Value::Null,
            };
            (field.response_key().to_string(), value)
        })
        .collect();
    Value::Object(object)
}
