use error::{ErrorCode, GraphqlError};
use serde::ser::SerializeMap;
use serde_json::Value;

use super::{EntityResolutionEngine, EntityResult};

pub const ENTITIES_FIELD: &str = "_entities";
pub const REPRESENTATIONS_ARGUMENT: &str = "representations";

/// Result of the `_entities(representations: [_Any!]!): [_Entity]!` root field, serialized
/// as a GraphQL response.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitiesResponse {
    /// `None` when the request itself was invalid.
    pub entities: Option<Vec<Option<Value>>>,
    pub errors: Vec<GraphqlError>,
}

impl EntitiesResponse {
    fn invalid_request(error: GraphqlError) -> Self {
        EntitiesResponse {
            entities: None,
            errors: vec![error.with_path(ENTITIES_FIELD)],
        }
    }

    fn from_results(results: Vec<EntityResult>) -> Self {
        let mut entities = Vec::with_capacity(results.len());
        let mut errors = Vec::new();

        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(entity) => entities.push(entity),
                Err(error) => {
                    entities.push(None);
                    errors.push(error.with_path((ENTITIES_FIELD, index)));
                }
            }
        }

        EntitiesResponse {
            entities: Some(entities),
            errors,
        }
    }
}

impl serde::Serialize for EntitiesResponse {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("data", &EntitiesData(self.entities.as_deref()))?;
        if !self.errors.is_empty() {
            map.serialize_entry("errors", &self.errors)?;
        }
        map.end()
    }
}

struct EntitiesData<'a>(Option<&'a [Option<Value>]>);

impl serde::Serialize for EntitiesData<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(ENTITIES_FIELD, &self.0)?;
        map.end()
    }
}

/// Reads the `representations` argument of the `_entities` field.
pub fn representations_argument(arguments: &Value) -> Result<Vec<Value>, GraphqlError> {
    match arguments.get(REPRESENTATIONS_ARGUMENT) {
        Some(Value::Array(representations)) => Ok(representations.clone()),
        _ => Err(GraphqlError::new(
            "The representations argument must be a list.",
            ErrorCode::BadRequest,
        )),
    }
}

impl EntityResolutionEngine {
    /// Resolves the `_entities` field from its arguments, e.g.
    /// `{"representations": [{"__typename": "Foo", "id": 42}]}`.
    pub async fn resolve_entities_field(&self, arguments: &Value) -> EntitiesResponse {
        match representations_argument(arguments) {
            Ok(representations) => EntitiesResponse::from_results(self.resolve(representations).await),
            Err(error) => EntitiesResponse::invalid_request(error),
        }
    }
}
