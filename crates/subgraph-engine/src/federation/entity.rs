//! Federation details of the types a subgraph exposes as [entities][1].
//!
//! [1]: https://www.apollographql.com/docs/federation/subgraph-spec

use indexmap::IndexMap;

use super::{FieldSet, FieldSetParseError, Representation};

/// Federation details for a particular type.
///
/// There should be one instance of this for each type of the schema, entity or not, so that
/// unknown typenames can be told apart from types without keys.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityDefinition {
    name: String,
    keys: Vec<FieldSet>,
    external_fields: Vec<String>,
}

impl EntityDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        EntityDefinition {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_key(mut self, key: FieldSet) -> Self {
        self.keys.push(key);
        self
    }

    /// Adds a key from its `@key(fields: "...")` string.
    pub fn with_key_fields(self, fields: &str) -> Result<Self, FieldSetParseError> {
        Ok(self.with_key(fields.parse()?))
    }

    #[must_use]
    pub fn with_external_field(mut self, field: impl Into<String>) -> Self {
        self.external_fields.push(field.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &FieldSet> + '_ {
        self.keys.iter()
    }

    pub fn is_entity(&self) -> bool {
        !self.keys.is_empty()
    }

    pub fn is_external(&self, field: &str) -> bool {
        self.external_fields.iter().any(|external| external == field)
    }

    /// Takes an `_Any` representation from the federation `_entities` field and determines
    /// which key the representation matches. The first satisfied key in declaration order wins.
    pub fn find_key(&self, representation: &Representation) -> Option<&FieldSet> {
        self.keys
            .iter()
            .find(|key| key.is_satisfied_by(representation.fields()))
    }
}

/// All the types known to the schema, by name.
#[derive(Clone, Debug, Default)]
pub struct EntitySchema {
    types: IndexMap<String, EntityDefinition>,
}

impl EntitySchema {
    pub fn builder() -> EntitySchemaBuilder {
        EntitySchemaBuilder(EntitySchema::default())
    }

    pub fn get(&self, typename: &str) -> Option<&EntityDefinition> {
        self.types.get(typename)
    }

    pub fn contains(&self, typename: &str) -> bool {
        self.types.contains_key(typename)
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityDefinition> + '_ {
        self.types.values().filter(|definition| definition.is_entity())
    }

    pub fn has_entities(&self) -> bool {
        self.entities().next().is_some()
    }
}

pub struct EntitySchemaBuilder(EntitySchema);

impl EntitySchemaBuilder {
    /// Registers a type. Registering the same name twice replaces the previous definition.
    #[must_use]
    pub fn with_type(mut self, definition: EntityDefinition) -> Self {
        self.add_type(definition);
        self
    }

    pub fn add_type(&mut self, definition: EntityDefinition) {
        self.0.types.insert(definition.name.clone(), definition);
    }

    pub fn build(self) -> EntitySchema {
        self.0
    }
}
