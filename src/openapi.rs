use openapiv3::{OpenAPI, ReferenceOr};
use std::collections::HashMap;
use std::path::Path;

use crate::config::load_document;

pub fn parse_openapi_spec_from_path<P: AsRef<Path>>(path: P) -> crate::Result<OpenAPI> {
    let path = path.as_ref();
    let location = path.to_string_lossy();
    if location.starts_with("http://") || location.starts_with("https://") {
        return Err(crate::Error::Validation(format!(
            "Remote specs are not supported, download {} first",
            location
        )));
    }

    let spec: OpenAPI = load_document(path)?;
    validate_spec(&spec)
        .map_err(|e| crate::Error::Validation(format!("{}: {}", path.display(), e)))?;
    Ok(spec)
}

pub fn parse_openapi_spec(spec: impl AsRef<str>) -> crate::Result<OpenAPI> {
    let spec: OpenAPI = serde_yaml::from_str(spec.as_ref())
        .map_err(|e| crate::Error::Parse(format!("Failed to parse YAML: {}", e)))?;
    validate_spec(&spec).map_err(crate::Error::Validation)?;
    Ok(spec)
}

/// Structural checks the deserializer alone does not enforce.
pub fn validate_spec(spec: &OpenAPI) -> Result<(), String> {
    if !spec.openapi.starts_with("3.") {
        return Err(format!(
            "Only OpenAPI 3.x specifications are supported, found {}",
            spec.openapi
        ));
    }

    if spec.info.title.is_empty() {
        return Err("API title is required".to_string());
    }

    let mut operation_ids: HashMap<&str, &str> = HashMap::new();
    for (path, path_item_ref) in &spec.paths.paths {
        if !path.starts_with('/') {
            return Err(format!("Path {} must start with /", path));
        }

        let path_item = match path_item_ref {
            ReferenceOr::Item(item) => item,
            ReferenceOr::Reference { reference } => {
                return Err(format!(
                    "Path item references are not supported: {} ({})",
                    reference, path
                ));
            }
        };

        for (_, operation) in path_item.iter() {
            if let Some(id) = &operation.operation_id {
                if let Some(previous) = operation_ids.insert(id, path) {
                    return Err(format!(
                        "operationId {} is used by both {} and {}",
                        id, previous, path
                    ));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SPEC_JSON: &str = r#"{
  "openapi": "3.0.0",
  "info": {
    "title": "Test API",
    "version": "1.0.0"
  },
  "paths": {
    "/users": {
      "get": {
        "operationId": "getUsers",
        "responses": {
          "200": {
            "description": "Successful response"
          }
        }
      }
    }
  }
}"#;

    const SPEC_YAML: &str = r#"
openapi: 3.0.3
info:
  title: Test API
  version: 2.0.0
paths:
  /pets:
    get:
      operationId: listPets
      responses:
        '200':
          description: ok
"#;

    #[test]
    fn test_parse_json_from_path() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(SPEC_JSON.as_bytes()).unwrap();

        let spec = parse_openapi_spec_from_path(file.path()).unwrap();
        assert_eq!(spec.info.title, "Test API");
        assert!(spec.paths.paths.contains_key("/users"));
    }

    #[test]
    fn test_parse_yaml_from_path() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(SPEC_YAML.as_bytes()).unwrap();

        let spec = parse_openapi_spec_from_path(file.path()).unwrap();
        assert_eq!(spec.info.version, "2.0.0");
    }

    #[test]
    fn test_parse_from_string() {
        assert!(parse_openapi_spec(SPEC_YAML).is_ok());
        assert!(parse_openapi_spec(SPEC_JSON).is_ok());
    }

    #[test]
    fn test_missing_file() {
        let result = parse_openapi_spec_from_path("/definitely/not/here.yaml");
        assert!(matches!(result, Err(crate::Error::Io(_))));
    }

    #[test]
    fn test_remote_spec_is_rejected() {
        let result = parse_openapi_spec_from_path("https://example.com/openapi.yaml");
        assert!(matches!(result, Err(crate::Error::Validation(_))));
    }

    #[test]
    fn test_invalid_document() {
        let result = parse_openapi_spec("openapi: [not, a, spec]");
        assert!(matches!(result, Err(crate::Error::Parse(_))));
    }

    #[test]
    fn test_validate_version() {
        let spec = SPEC_YAML.replace("3.0.3", "'2.0'");
        let err = parse_openapi_spec(spec).unwrap_err();
        assert!(err.to_string().contains("Only OpenAPI 3.x"));
    }

    #[test]
    fn test_validate_title() {
        let spec = SPEC_YAML.replace("title: Test API", "title: ''");
        let err = parse_openapi_spec(spec).unwrap_err();
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn test_validate_duplicate_operation_ids() {
        let spec = r#"
openapi: 3.0.3
info:
  title: Dupes
  version: 1.0.0
paths:
  /a:
    get:
      operationId: fetch
      responses:
        '200':
          description: ok
  /b:
    get:
      operationId: fetch
      responses:
        '200':
          description: ok
"#;
        let err = parse_openapi_spec(spec).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("fetch"));
        assert!(message.contains("/a"));
        assert!(message.contains("/b"));
    }

    #[test]
    fn test_validate_path_references() {
        let spec = r##"
openapi: 3.0.3
info:
  title: Refs
  version: 1.0.0
paths:
  /a:
    $ref: '#/components/pathItems/a'
"##;
        let err = parse_openapi_spec(spec).unwrap_err();
        assert!(err.to_string().contains("references are not supported"));
    }
}
