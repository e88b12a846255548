use std::fmt;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Parse(String),
    Validation(String),
    Extension(String),
    Plugin(String),
    Serialization(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Parse(msg) => write!(f, "Parse error: {}", msg),
            Error::Validation(msg) => write!(f, "Validation error: {}", msg),
            Error::Extension(msg) => write!(f, "Extension error: {}", msg),
            Error::Plugin(msg) => write!(f, "Plugin error: {}", msg),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let io_error = Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        assert!(io_error.to_string().contains("IO error"));

        let parse_error = Error::Parse("invalid syntax".to_string());
        assert_eq!(parse_error.to_string(), "Parse error: invalid syntax");

        let validation_error = Error::Validation("missing title".to_string());
        assert_eq!(validation_error.to_string(), "Validation error: missing title");

        let extension_error = Error::Extension("x-operation-name is not a string".to_string());
        assert_eq!(
            extension_error.to_string(),
            "Extension error: x-operation-name is not a string"
        );

        let plugin_error = Error::Plugin("no plugin for kind `cli`".to_string());
        assert_eq!(plugin_error.to_string(), "Plugin error: no plugin for kind `cli`");
    }

    #[test]
    fn test_error_from_conversions() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let error: Error = io_err.into();
        assert!(matches!(error, Error::Io(_)));

        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error: Error = json_err.into();
        assert!(matches!(error, Error::Parse(_)));

        let yaml_err = serde_yaml::from_str::<Vec<String>>("a: b").unwrap_err();
        let error: Error = yaml_err.into();
        assert!(matches!(error, Error::Parse(_)));
    }
}
