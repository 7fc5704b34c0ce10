use serde_json::{Map, Value};

pub const TYPENAME_FIELD: &str = "__typename";

/// An `_Any` value from the `representations` argument of `_entities`: the typename of an
/// entity together with the fields identifying it.
#[derive(Debug, Clone, PartialEq)]
pub struct Representation {
    typename: String,
    fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepresentationError {
    #[error("a representation must be an object")]
    NotAnObject,
    #[error("a representation must have a __typename string")]
    MissingTypename,
}

impl Representation {
    pub fn typename(&self) -> &str {
        &self.typename
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// All fields, including `__typename`.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl TryFrom<Value> for Representation {
    type Error = RepresentationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(fields) = value else {
            return Err(RepresentationError::NotAnObject);
        };
        Self::try_from(fields)
    }
}

impl TryFrom<Map<String, Value>> for Representation {
    type Error = RepresentationError;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let typename = fields
            .get(TYPENAME_FIELD)
            .and_then(Value::as_str)
            .ok_or(RepresentationError::MissingTypename)?
            .to_string();

        Ok(Representation { typename, fields })
    }
}
