//! Entity types of a products subgraph.
//!
//! * `Foo`, `Product`: batched resolvers over in-memory catalogs.
//! * `User`: single resolver, users `1` and `2` exist.
//! * `Review`: only referenced by this subgraph, resolved to its representation.
//! * `Account`: declared without resolver.

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use subgraph_engine::federation::{
    BatchedEntityResolver, EntityDefinition, EntityResolutionEngine, EntityResolverError, EntityResolverRegistry,
    EntitySchema, Representation,
};

/// Batched resolver returning the catalog entry having every field of the representation.
/// Every batch received is recorded.
#[derive(Clone, Default)]
pub struct Catalog {
    entries: Vec<Value>,
    batches: Arc<Mutex<Vec<Vec<Value>>>>,
}

impl Catalog {
    pub fn new(entries: impl IntoIterator<Item = Value>) -> Self {
        Catalog {
            entries: entries.into_iter().collect(),
            batches: Default::default(),
        }
    }

    pub fn foos() -> Self {
        Catalog::new([
            json!({"__typename": "Foo", "id": 42, "name": "the answer"}),
            json!({"__typename": "Foo", "id": 69, "name": "nice"}),
        ])
    }

    pub fn products() -> Self {
        Catalog::new([
            json!({"__typename": "Product", "upc": "1", "sku": "chair", "region": "eu", "price": 10}),
            json!({"__typename": "Product", "upc": "2", "sku": "table", "region": "eu", "price": 120}),
            json!({"__typename": "Product", "upc": "3", "sku": "chair", "region": "us", "price": 12}),
        ])
    }

    /// Representations of every batch, in the order received.
    pub fn batches(&self) -> Vec<Vec<Value>> {
        self.batches.lock().unwrap().clone()
    }

    fn find(&self, representation: &Representation) -> Option<Value> {
        self.entries
            .iter()
            .find(|entry| {
                representation
                    .fields()
                    .iter()
                    .all(|(field, value)| entry.get(field) == Some(value))
            })
            .cloned()
    }
}

#[async_trait::async_trait]
impl BatchedEntityResolver for Catalog {
    async fn resolve_batch(
        &self,
        representations: Vec<Representation>,
    ) -> Result<Vec<Option<Value>>, EntityResolverError> {
        self.batches
            .lock()
            .unwrap()
            .push(representations.iter().cloned().map(Representation::into_value).collect());

        Ok(representations
            .iter()
            .map(|representation| self.find(representation))
            .collect())
    }
}

pub fn schema() -> EntitySchema {
    EntitySchema::builder()
        .with_type(EntityDefinition::new("Foo").with_key_fields("id").unwrap())
        .with_type(
            EntityDefinition::new("Product")
                .with_key_fields("upc")
                .unwrap()
                .with_key_fields("sku region")
                .unwrap(),
        )
        .with_type(EntityDefinition::new("User").with_key_fields("id").unwrap())
        .with_type(
            EntityDefinition::new("Review")
                .with_key_fields("id product { upc }")
                .unwrap()
                .with_external_field("body"),
        )
        .with_type(EntityDefinition::new("Account").with_key_fields("id").unwrap())
        .build()
}

pub fn registry(foos: Catalog, products: Catalog) -> EntityResolverRegistry {
    let mut registry = EntityResolverRegistry::new();
    registry
        .register_batched("Foo", foos)
        .register_batched("Product", products)
        .register_single("User", |representation: Representation| async move {
            match representation.get("id") {
                Some(Value::String(id)) if id == "1" || id == "2" => {
                    Ok(Some(json!({"__typename": "User", "id": id, "username": format!("user{id}")})))
                }
                Some(Value::String(id)) if id == "500" => Err(EntityResolverError::failed("users service unavailable")),
                _ => Err(EntityResolverError::NotFound),
            }
        })
        .register_representation("Review");
    registry
}

pub fn engine() -> EntityResolutionEngine {
    EntityResolutionEngine::new(schema(), registry(Catalog::foos(), Catalog::products()))
}
