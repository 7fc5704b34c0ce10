use std::sync::Arc;

use config::FederationConfig;
use error::{ErrorCode, GraphqlError, GraphqlResult};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::Instrument as _;

use super::{
    BatchedEntityResolver, EntityResolverError, EntityResolverRegistry, EntitySchema, Representation,
    ResolverCapability, SingleEntityResolver,
};

/// Outcome of the resolution of one representation. `Ok(None)` is a null entity without error.
pub type EntityResult = GraphqlResult<Option<Value>>;

/// Resolves `_entities` representations into entities.
///
/// Representations are grouped by typename and each group is dispatched to the resolver
/// registered for its type. Failures are scoped to the position of the representation that
/// caused them; the output always has the length and the order of the input.
#[derive(Clone, Debug)]
pub struct EntityResolutionEngine {
    schema: Arc<EntitySchema>,
    registry: Arc<EntityResolverRegistry>,
    batch_size: Option<usize>,
}

/// Representations of one type, with their position in the request.
struct ResolutionGroup {
    indices: Vec<usize>,
    representations: Vec<Representation>,
}

impl EntityResolutionEngine {
    pub fn new(schema: impl Into<Arc<EntitySchema>>, registry: impl Into<Arc<EntityResolverRegistry>>) -> Self {
        EntityResolutionEngine {
            schema: schema.into(),
            registry: registry.into(),
            batch_size: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: &FederationConfig) -> Self {
        self.batch_size = config.entities_batch_size.filter(|size| *size > 0);
        self
    }

    pub fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    /// Resolves raw `_Any` values. The n-th result belongs to the n-th representation.
    pub async fn resolve(&self, representations: Vec<Value>) -> Vec<EntityResult> {
        let span = tracing::info_span!("entities", representations = representations.len());
        self.resolve_inner(representations).instrument(span).await
    }

    async fn resolve_inner(&self, representations: Vec<Value>) -> Vec<EntityResult> {
        let mut results: Vec<Option<EntityResult>> = vec![None; representations.len()];
        let mut groups: IndexMap<String, ResolutionGroup> = IndexMap::new();

        for (index, value) in representations.into_iter().enumerate() {
            let representation = match Representation::try_from(value) {
                Ok(representation) => representation,
                Err(err) => {
                    tracing::warn!("Invalid representation at index {index}: {err}");
                    results[index] = Some(Err(GraphqlError::invalid_representation()));
                    continue;
                }
            };

            let Some(definition) = self.schema.get(representation.typename()) else {
                tracing::warn!("Unknown type {} at index {index}", representation.typename());
                results[index] = Some(Err(GraphqlError::unknown_type(representation.typename())));
                continue;
            };

            let Some(key) = definition.find_key(&representation) else {
                tracing::warn!(
                    "Representation of type {} at index {index} does not satisfy any key",
                    representation.typename()
                );
                results[index] = Some(Err(GraphqlError::unsatisfied_key()));
                continue;
            };
            tracing::debug!("Representation at index {index} matched key '{key}'");

            let group = groups
                .entry(representation.typename().to_string())
                .or_insert_with(|| ResolutionGroup {
                    indices: Vec::new(),
                    representations: Vec::new(),
                });
            group.indices.push(index);
            group.representations.push(representation);
        }

        for (typename, group) in groups {
            let ResolutionGroup {
                indices,
                representations,
            } = group;
            let group_results = self.resolve_group(&typename, representations).await;
            debug_assert_eq!(indices.len(), group_results.len());

            for (index, result) in indices.into_iter().zip(group_results) {
                results[index] = Some(result);
            }
        }

        results
            .into_iter()
            .map(|result| result.unwrap_or_else(|| Err(GraphqlError::internal_server_error())))
            .collect()
    }

    /// Resolves all representations of one type. Always returns exactly one result per
    /// representation, in order.
    async fn resolve_group(&self, typename: &str, representations: Vec<Representation>) -> Vec<EntityResult> {
        let Some(capability) = self.registry.lookup(typename) else {
            tracing::warn!("No entity resolver for type {typename}");
            return vec![Err(GraphqlError::missing_entity_resolver(typename)); representations.len()];
        };

        tracing::debug!(
            "Resolving {} representations of type {typename} with the {} resolver",
            representations.len(),
            capability.kind()
        );

        match capability {
            ResolverCapability::Representation => representations
                .into_iter()
                .map(|representation| Ok(Some(representation.into_value())))
                .collect(),
            ResolverCapability::Single(resolver) => resolve_single(typename, resolver.as_ref(), representations).await,
            ResolverCapability::Batched(resolver) => {
                let chunk_size = self.batch_size.unwrap_or(representations.len()).max(1);
                let mut results = Vec::with_capacity(representations.len());
                let mut representations = representations.into_iter().peekable();

                while representations.peek().is_some() {
                    let chunk = representations.by_ref().take(chunk_size).collect::<Vec<_>>();
                    results.extend(resolve_batch(typename, resolver.as_ref(), chunk).await);
                }

                results
            }
        }
    }
}

async fn resolve_single(
    typename: &str,
    resolver: &dyn SingleEntityResolver,
    representations: Vec<Representation>,
) -> Vec<EntityResult> {
    let resolutions = representations
        .into_iter()
        .map(|representation| resolver.resolve(representation));

    futures::future::join_all(resolutions)
        .await
        .into_iter()
        .map(|result| result.map_err(|err| resolver_error(typename, err)))
        .collect()
}

async fn resolve_batch(
    typename: &str,
    resolver: &dyn BatchedEntityResolver,
    representations: Vec<Representation>,
) -> Vec<EntityResult> {
    let expected = representations.len();

    let mut entities = match resolver.resolve_batch(representations).await {
        Ok(entities) => entities,
        Err(err) => {
            tracing::warn!("Batched entity resolver for type {typename} failed: {err}");
            return vec![Err(resolver_error(typename, err)); expected];
        }
    };

    let actual = entities.len();
    if actual > expected {
        tracing::error!("Batched entity resolver for type {typename} returned more entities than expected");
        entities.truncate(expected);
    }

    let mut results = entities.into_iter().map(Ok).collect::<Vec<_>>();
    if actual < expected {
        tracing::error!("Batched entity resolver for type {typename} returned less entities than expected");
        let error = GraphqlError::new(
            format!(
                "Batched entity resolver for type \"{typename}\" returned {actual} results for {expected} representations."
            ),
            ErrorCode::EntityResolutionError,
        );
        results.resize(expected, Err(error));
    }

    results
}

fn resolver_error(typename: &str, err: EntityResolverError) -> GraphqlError {
    match err {
        EntityResolverError::NotFound => GraphqlError::new(
            format!("Entity of type \"{typename}\" was not found."),
            ErrorCode::EntityResolutionError,
        ),
        EntityResolverError::Failed(message) => GraphqlError::new(message, ErrorCode::EntityResolutionError),
    }
}
