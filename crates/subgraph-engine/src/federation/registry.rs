use std::{collections::HashMap, future::Future, sync::Arc};

use serde_json::Value;

use super::Representation;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntityResolverError {
    /// The resolver could not find an entity matching the representation.
    #[error("entity not found")]
    NotFound,
    #[error("{0}")]
    Failed(String),
}

impl EntityResolverError {
    pub fn failed(message: impl Into<String>) -> Self {
        EntityResolverError::Failed(message.into())
    }
}

/// Resolves one representation at a time. `Ok(None)` is a null entity without error.
#[async_trait::async_trait]
pub trait SingleEntityResolver: Send + Sync {
    async fn resolve(&self, representation: Representation) -> Result<Option<Value>, EntityResolverError>;
}

/// Resolves all the representations of a type in one call. The returned list must be
/// positionally aligned with the input: the n-th entry is the entity for the n-th
/// representation, `None` when it could not be resolved.
#[async_trait::async_trait]
pub trait BatchedEntityResolver: Send + Sync {
    async fn resolve_batch(
        &self,
        representations: Vec<Representation>,
    ) -> Result<Vec<Option<Value>>, EntityResolverError>;
}

#[async_trait::async_trait]
impl<F, Fut> SingleEntityResolver for F
where
    F: Fn(Representation) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<Value>, EntityResolverError>> + Send + 'static,
{
    async fn resolve(&self, representation: Representation) -> Result<Option<Value>, EntityResolverError> {
        self(representation).await
    }
}

/// Wraps a closure taking the whole batch. Closures implement [SingleEntityResolver]
/// directly, so batched ones need a distinct type.
pub struct BatchFn<F>(pub F);

#[async_trait::async_trait]
impl<F, Fut> BatchedEntityResolver for BatchFn<F>
where
    F: Fn(Vec<Representation>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<Option<Value>>, EntityResolverError>> + Send + 'static,
{
    async fn resolve_batch(
        &self,
        representations: Vec<Representation>,
    ) -> Result<Vec<Option<Value>>, EntityResolverError> {
        (self.0)(representations).await
    }
}

/// How the entities of a type are resolved, chosen when registering it.
#[derive(Clone)]
pub enum ResolverCapability {
    Single(Arc<dyn SingleEntityResolver>),
    Batched(Arc<dyn BatchedEntityResolver>),
    /// This "resolver" doesn't actually resolve data in the same way the others do.
    ///
    /// This should be used for entities whose primary representation lives in another
    /// subgraph while we only reference them: the result of resolution is the representation
    /// we were passed. All the fields of such a type must be key or external fields.
    Representation,
}

impl ResolverCapability {
    pub fn kind(&self) -> &'static str {
        match self {
            ResolverCapability::Single(_) => "single",
            ResolverCapability::Batched(_) => "batched",
            ResolverCapability::Representation => "representation",
        }
    }
}

impl std::fmt::Debug for ResolverCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ResolverCapability").field(&self.kind()).finish()
    }
}

/// Entity resolvers registered per typename at schema-build time. Read-only afterwards.
#[derive(Default, Clone, Debug)]
pub struct EntityResolverRegistry {
    resolvers: HashMap<String, ResolverCapability>,
}

impl EntityResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the capability for a type. A later registration for the same type replaces
    /// the earlier one.
    pub fn register(&mut self, typename: impl Into<String>, capability: ResolverCapability) -> &mut Self {
        let typename = typename.into();
        if let Some(previous) = self.resolvers.insert(typename.clone(), capability) {
            tracing::debug!("Replacing {} entity resolver of type {typename}", previous.kind());
        }
        self
    }

    pub fn register_single(
        &mut self,
        typename: impl Into<String>,
        resolver: impl SingleEntityResolver + 'static,
    ) -> &mut Self {
        self.register(typename, ResolverCapability::Single(Arc::new(resolver)))
    }

    pub fn register_batched(
        &mut self,
        typename: impl Into<String>,
        resolver: impl BatchedEntityResolver + 'static,
    ) -> &mut Self {
        self.register(typename, ResolverCapability::Batched(Arc::new(resolver)))
    }

    pub fn register_representation(&mut self, typename: impl Into<String>) -> &mut Self {
        self.register(typename, ResolverCapability::Representation)
    }

    pub fn lookup(&self, typename: &str) -> Option<&ResolverCapability> {
        self.resolvers.get(typename)
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}
