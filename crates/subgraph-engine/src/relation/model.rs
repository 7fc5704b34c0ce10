use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde_json::{Map, Value};

use crate::pagination::Page;

/// A record loaded from the relational store.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Model {
    type_name: String,
    attributes: Map<String, Value>,
    /// Join table data of a belongs-to-many row.
    pivot: Option<Map<String, Value>>,
    relations: IndexMap<String, RelationValue>,
}

/// Content of a loaded relation slot.
#[derive(Debug, Clone, PartialEq)]
pub enum RelationValue {
    Collection(Vec<Model>),
    Page(Page<Model>),
}

impl RelationValue {
    pub fn items(&self) -> &[Model] {
        match self {
            RelationValue::Collection(models) => models,
            RelationValue::Page(page) => &page.items,
        }
    }
}

impl Model {
    pub fn new(type_name: impl Into<String>) -> Self {
        Model {
            type_name: type_name.into(),
            ..Default::default()
        }
    }

    pub fn from_attributes(type_name: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Model {
            type_name: type_name.into(),
            attributes,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.attributes
    }

    pub fn pivot(&self) -> Option<&Map<String, Value>> {
        self.pivot.as_ref()
    }

    pub fn set_pivot(&mut self, pivot: Map<String, Value>) {
        self.pivot = Some(pivot);
    }

    pub fn relation_loaded(&self, relation: &str) -> bool {
        self.relations.contains_key(relation)
    }

    pub fn set_relation(&mut self, relation: impl Into<String>, value: RelationValue) {
        self.relations.insert(relation.into(), value);
    }

    pub fn relation(&self, relation: &str) -> Option<&RelationValue> {
        self.relations.get(relation)
    }

    /// Items of a loaded relation, paginated or not.
    pub fn related(&self, relation: &str) -> Option<&[Model]> {
        self.relation(relation).map(RelationValue::items)
    }

    pub fn paginated(&self, relation: &str) -> Option<&Page<Model>> {
        match self.relation(relation)? {
            RelationValue::Page(page) => Some(page),
            RelationValue::Collection(_) => None,
        }
    }

    /// Attributes, pivot data under `pivot` and every loaded relation.
    pub fn to_value(&self) -> Value {
        // Keys are strings and values are json already, serialization cannot fail.
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl serde::Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        for (name, value) in &self.attributes {
            map.serialize_entry(name, value)?;
        }
        if let Some(pivot) = &self.pivot {
            map.serialize_entry("pivot", pivot)?;
        }
        for (name, relation) in &self.relations {
            match relation {
                RelationValue::Collection(models) => map.serialize_entry(name, models)?,
                RelationValue::Page(page) => map.serialize_entry(name, page)?,
            }
        }
        map.end()
    }
}
