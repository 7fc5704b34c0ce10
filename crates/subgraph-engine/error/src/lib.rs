mod code;
mod path;

pub use code::*;
pub use path::*;
use std::borrow::Cow;

use serde::ser::SerializeMap;

pub type GraphqlResult<T> = Result<T, GraphqlError>;

#[derive(Debug, Clone, PartialEq)]
pub struct GraphqlError {
    pub message: Cow<'static, str>,
    pub code: ErrorCode,
    pub path: Option<ErrorPath>,
    // Serialized as a map, but kept as a Vec for efficiency.
    pub extensions: Vec<(Cow<'static, str>, serde_json::Value)>,
}

impl GraphqlError {
    pub fn new(message: impl Into<Cow<'static, str>>, code: ErrorCode) -> Self {
        GraphqlError {
            message: message.into(),
            code,
            path: None,
            extensions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<ErrorPath>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_extension(mut self, key: impl Into<Cow<'static, str>>, value: impl Into<serde_json::Value>) -> Self {
        let key = key.into();
        self.extensions.push((key, value.into()));
        self
    }

    // ------------- //
    // Common errors //
    // ------------- //

    pub fn unknown_type(typename: &str) -> Self {
        GraphqlError::new(
            format!("Unknown type: \"{typename}\"."),
            ErrorCode::EntityResolutionError,
        )
    }

    pub fn missing_entity_resolver(typename: &str) -> Self {
        GraphqlError::new(
            format!("No entity resolver found for type \"{typename}\"."),
            ErrorCode::EntityResolutionError,
        )
    }

    pub fn unsatisfied_key() -> Self {
        GraphqlError::new(
            "Representation does not satisfy any set of uniquely identifying keys.",
            ErrorCode::EntityResolutionError,
        )
    }

    pub fn invalid_representation() -> Self {
        GraphqlError::new(
            "Representation must be an object containing a __typename string.",
            ErrorCode::BadRequest,
        )
    }

    pub fn data_fetch_error(reason: impl std::fmt::Display) -> Self {
        GraphqlError::new(format!("Failed to fetch data: {reason}"), ErrorCode::DataFetchError)
    }

    pub fn internal_server_error() -> Self {
        GraphqlError::new("Internal server error", ErrorCode::InternalServerError)
    }
}

impl std::fmt::Display for GraphqlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.message.fmt(f)
    }
}

impl std::error::Error for GraphqlError {}

impl serde::Serialize for GraphqlError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("message", &self.message)?;
        if let Some(path) = &self.path {
            map.serialize_entry("path", path)?;
        }
        map.serialize_entry("extensions", &SerializableExtensions(self))?;
        map.end()
    }
}

struct SerializableExtensions<'a>(&'a GraphqlError);

impl serde::Serialize for SerializableExtensions<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.extensions.len() + 1))?;
        for (key, value) in &self.0.extensions {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry("code", &self.0.code)?;
        map.end()
    }
}
