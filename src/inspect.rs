use http::Method;
use openapiv3::{
    Components, OpenAPI, Parameter, ParameterData, ParameterSchemaOrContent, PathItem,
    ReferenceOr, Schema, SchemaKind, StatusCode, Type,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use crate::case::{Case, Identifiers, to_pascal};

/// Vendor extension carrying a JSON string that overrides the operation name.
pub const OPERATION_NAME_EXTENSION: &str = "x-operation-name";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Params {
    pub kind: String,
    pub name: String,
}

/// Parameter and body shapes of one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub request_body: Option<Params>,
    pub response_body: Option<Params>,
    pub query_params: Vec<Params>,
    pub request_headers: Vec<Params>,
    pub path_params: Vec<Params>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectedOperation {
    pub method: String,
    pub path: String,
    pub operation_id: Option<String>,
    pub override_name: Option<String>,
    pub tags: Vec<String>,
    pub names: Identifiers,
    /// Every `x-` extension on the operation, by name.
    pub extensions: BTreeMap<String, serde_json::Value>,
    pub signature: Operation,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Inspection {
    pub title: String,
    pub version: String,
    pub namespace: Option<String>,
    pub tags: BTreeSet<String>,
    /// Tag to generated class name.
    pub tag_names: BTreeMap<String, String>,
    pub operations: Vec<InspectedOperation>,
}

impl Inspection {
    pub fn write_report<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for operation in &self.operations {
            let route = format!("{} {}", operation.method, operation.path);
            for case in Case::ALL {
                writeln!(out, "{} -> {}", operation.names.get(case), route)?;
            }
            for (name, value) in &operation.extensions {
                match value {
                    serde_json::Value::String(text) => writeln!(out, "{}: {}", name, text)?,
                    other => writeln!(out, "{}: {}", name, other)?,
                }
            }
            for tag in &operation.tags {
                writeln!(out, "{}", tag)?;
            }
            writeln!(out)?;
        }

        for name in self.tag_names.values() {
            writeln!(out, "{}", name)?;
        }
        Ok(())
    }
}

fn path_operations(item: &PathItem) -> [(Method, Option<&openapiv3::Operation>); 8] {
    [
        (Method::GET, item.get.as_ref()),
        (Method::PUT, item.put.as_ref()),
        (Method::POST, item.post.as_ref()),
        (Method::DELETE, item.delete.as_ref()),
        (Method::OPTIONS, item.options.as_ref()),
        (Method::HEAD, item.head.as_ref()),
        (Method::PATCH, item.patch.as_ref()),
        (Method::TRACE, item.trace.as_ref()),
    ]
}

/// Walk every operation of a validated document and derive its names.
pub fn inspect(spec: &OpenAPI) -> crate::Result<Inspection> {
    let mut tags = BTreeSet::new();
    if let Some(tag) = spec.tags.first() {
        tags.insert(tag.name.clone());
    }

    let components = spec.components.as_ref();
    let mut operations = Vec::new();

    for (path, path_item_ref) in &spec.paths.paths {
        let path_item = match path_item_ref {
            ReferenceOr::Item(item) => item,
            ReferenceOr::Reference { reference } => {
                return Err(crate::Error::Validation(format!(
                    "Path item references are not supported: {}",
                    reference
                )));
            }
        };

        for (method, operation) in path_operations(path_item) {
            let Some(operation) = operation else {
                continue;
            };

            let override_name = operation_name_override(operation, &method, path)?;

            if let Some(tag) = operation.tags.first() {
                tags.insert(tag.clone());
            }

            let operation_id = operation.operation_id.clone();
            let names = Identifiers::new(operation_id.as_deref().unwrap_or_default());
            log::debug!("{} {} -> {}", method, path, names.kebab);

            operations.push(InspectedOperation {
                method: method.to_string(),
                path: path.clone(),
                operation_id,
                override_name,
                tags: operation.tags.clone(),
                names,
                extensions: operation
                    .extensions
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect(),
                signature: signature(path_item, operation, components),
            });
        }
    }

    log::info!(
        "Inspected {} operations across {} tags",
        operations.len(),
        tags.len()
    );

    let tag_names = tags
        .iter()
        .map(|tag| (tag.clone(), to_pascal(tag)))
        .collect();

    Ok(Inspection {
        title: spec.info.title.clone(),
        version: spec.info.version.clone(),
        namespace: server_namespace(spec),
        tags,
        tag_names,
        operations,
    })
}

fn operation_name_override(
    operation: &openapiv3::Operation,
    method: &Method,
    path: &str,
) -> crate::Result<Option<String>> {
    let Some(value) = operation.extensions.get(OPERATION_NAME_EXTENSION) else {
        return Ok(None);
    };

    let name = serde_json::from_value::<String>(value.clone()).map_err(|e| {
        crate::Error::Extension(format!(
            "{} on {} {} must be a string, found {}: {}",
            OPERATION_NAME_EXTENSION, method, path, value, e
        ))
    })?;
    log::debug!("{} {} overridden as {}", method, path, name);
    Ok(Some(name))
}

fn server_namespace(spec: &OpenAPI) -> Option<String> {
    let server = spec.servers.first()?;
    let uri = server.url.parse::<http::Uri>().ok()?;
    uri.host().map(crate::domain::host_namespace)
}

fn reference_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

/// Resolve a local `#/components/...` reference one level deep.
fn resolve<'a, T>(
    item: &'a ReferenceOr<T>,
    components: Option<&'a Components>,
    lookup: impl Fn(&'a Components, &str) -> Option<&'a ReferenceOr<T>>,
) -> Option<&'a T> {
    match item {
        ReferenceOr::Item(item) => Some(item),
        ReferenceOr::Reference { reference } => {
            match lookup(components?, reference_name(reference)) {
                Some(ReferenceOr::Item(item)) => Some(item),
                _ => {
                    log::warn!("Unresolved reference {}", reference);
                    None
                }
            }
        }
    }
}

fn schema_kind(schema: &ReferenceOr<Schema>) -> String {
    let kind = match schema {
        ReferenceOr::Reference { reference } => return reference_name(reference).to_string(),
        ReferenceOr::Item(schema) => match &schema.schema_kind {
            SchemaKind::Type(Type::String(_)) => "string",
            SchemaKind::Type(Type::Number(_)) => "number",
            SchemaKind::Type(Type::Integer(_)) => "integer",
            SchemaKind::Type(Type::Boolean(_)) => "boolean",
            SchemaKind::Type(Type::Object(_)) => "object",
            SchemaKind::Type(Type::Array(_)) => "array",
            SchemaKind::OneOf { .. } => "oneOf",
            SchemaKind::AllOf { .. } => "allOf",
            SchemaKind::AnyOf { .. } => "anyOf",
            SchemaKind::Not { .. } => "not",
            SchemaKind::Any(_) => "any",
        },
    };
    kind.to_string()
}

fn media_params<'a>(
    mut content: impl Iterator<Item = (&'a String, &'a openapiv3::MediaType)>,
) -> Option<Params> {
    let (media_type, media) = content.next()?;
    Some(Params {
        kind: media
            .schema
            .as_ref()
            .map(schema_kind)
            .unwrap_or_else(|| "any".to_string()),
        name: media_type.clone(),
    })
}

fn parameter_params(data: &ParameterData) -> Params {
    let kind = match &data.format {
        ParameterSchemaOrContent::Schema(schema) => schema_kind(schema),
        ParameterSchemaOrContent::Content(content) => media_params(content.iter())
            .map(|params| params.kind)
            .unwrap_or_else(|| "any".to_string()),
    };
    Params {
        kind,
        name: data.name.clone(),
    }
}

fn upsert(list: &mut Vec<Params>, params: Params) {
    match list.iter_mut().find(|existing| existing.name == params.name) {
        Some(existing) => *existing = params,
        None => list.push(params),
    }
}

fn signature(
    path_item: &PathItem,
    operation: &openapiv3::Operation,
    components: Option<&Components>,
) -> Operation {
    let mut signature = Operation::default();

    // Operation-level parameters replace path-level ones of the same name.
    for param_ref in path_item.parameters.iter().chain(&operation.parameters) {
        let Some(parameter) = resolve(param_ref, components, |c, name| c.parameters.get(name))
        else {
            continue;
        };
        match parameter {
            Parameter::Query { parameter_data, .. } => {
                upsert(&mut signature.query_params, parameter_params(parameter_data))
            }
            Parameter::Header { parameter_data, .. } => {
                upsert(&mut signature.request_headers, parameter_params(parameter_data))
            }
            Parameter::Path { parameter_data, .. } => {
                upsert(&mut signature.path_params, parameter_params(parameter_data))
            }
            Parameter::Cookie { .. } => {}
        }
    }

    signature.request_body = operation
        .request_body
        .as_ref()
        .and_then(|body| resolve(body, components, |c, name| c.request_bodies.get(name)))
        .and_then(|body| media_params(body.content.iter()));

    let success = operation.responses.responses.iter().filter(|(status, _)| match status {
        StatusCode::Code(code) => (200..300).contains(code),
        StatusCode::Range(range) => *range == 2,
    });
    signature.response_body = success
        .map(|(_, response)| response)
        .chain(operation.responses.default.as_ref())
        .filter_map(|response| resolve(response, components, |c, name| c.responses.get(name)))
        .find_map(|response| media_params(response.content.iter()));

    signature
}
