use std::future::Future;

use error::GraphqlError;
use serde_json::Value;

use super::Model;

/// Attributes of a belongs-to-many row starting with this prefix are join table columns.
pub const PIVOT_PREFIX: &str = "pivot_";

/// Attribute stamped on has-many-through rows with the key of the parent they were fetched for.
pub const THROUGH_KEY: &str = "through_key";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("type {parent_type} has no relation named {relation}")]
    UnknownRelation { parent_type: String, relation: String },
    #[error("connection to the data source failed: {0}")]
    Connection(String),
    #[error("query failed: {0}")]
    Query(String),
}

impl From<FetchError> for GraphqlError {
    fn from(err: FetchError) -> Self {
        GraphqlError::data_fetch_error(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    HasMany,
    /// Through a join table whose columns end up in the pivot of each row.
    BelongsToMany,
    /// Through an intermediate model.
    HasManyThrough,
}

/// A to-many relation between `parent_type` and `related_type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDefinition {
    pub name: String,
    pub parent_type: String,
    pub related_type: String,
    pub kind: RelationKind,
    /// Attribute of the parent the relation is keyed on.
    pub local_key: String,
    /// Attribute of the related row, or of its pivot for belongs-to-many, equal to the parent `local_key`.
    pub foreign_key: String,
}

impl RelationDefinition {
    pub fn new(
        name: impl Into<String>,
        parent_type: impl Into<String>,
        related_type: impl Into<String>,
        kind: RelationKind,
    ) -> Self {
        RelationDefinition {
            name: name.into(),
            parent_type: parent_type.into(),
            related_type: related_type.into(),
            kind,
            local_key: "id".into(),
            foreign_key: String::new(),
        }
    }

    #[must_use]
    pub fn with_keys(mut self, local_key: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        self.local_key = local_key.into();
        self.foreign_key = foreign_key.into();
        self
    }

    pub fn parent_key<'a>(&self, parent: &'a Model) -> Option<&'a Value> {
        parent.get(&self.local_key)
    }

    /// Key of the parent owning a fetched row.
    pub fn related_key<'a>(&self, related: &'a Model) -> Option<&'a Value> {
        match self.kind {
            RelationKind::HasMany => related.get(&self.foreign_key),
            RelationKind::BelongsToMany => related.pivot()?.get(&self.foreign_key),
            RelationKind::HasManyThrough => related.get(THROUGH_KEY),
        }
    }

    /// Relations going through another table must select the columns they match on
    /// next to the ones requested.
    pub fn joins_through(&self) -> bool {
        matches!(self.kind, RelationKind::BelongsToMany | RelationKind::HasManyThrough)
    }
}

/// A query over the rows of a relation for a single parent.
pub trait RelationQuery: Send {
    /// Keeps `limit` rows after skipping `offset`, within this query only.
    fn for_page(&mut self, offset: u64, limit: u64);

    /// Columns explicitly selected so far, empty when selecting every column.
    fn selected_columns(&self) -> &[String];

    fn select(&mut self, columns: Vec<String>);
}

/// The relational store the relations are loaded from.
pub trait RelationalQueryProvider: Send + Sync {
    type Query: RelationQuery;

    fn relation(&self, parent_type: &str, relation: &str) -> Option<RelationDefinition>;

    /// A query over the related rows of `parent` only.
    fn relation_query(&self, parent: &Model, relation: &RelationDefinition) -> Result<Self::Query, FetchError>;

    /// Number of rows matched by each query, in the order of the queries.
    fn count_related(
        &self,
        relation: &RelationDefinition,
        queries: Vec<Self::Query>,
    ) -> impl Future<Output = Result<Vec<u64>, FetchError>> + Send;

    /// Executes all queries as a single `UNION ALL` in one round trip. Each query keeps its own
    /// ordering and window, rows are not de-duplicated.
    fn execute_union(
        &self,
        relation: &RelationDefinition,
        queries: Vec<Self::Query>,
    ) -> impl Future<Output = Result<Vec<Model>, FetchError>> + Send;

    /// Columns a query of this relation must select for its rows to be matched back to their parent.
    fn should_select_columns(&self, relation: &RelationDefinition) -> Vec<String>;

    /// Relations of `related_type` loaded along each of its rows.
    fn default_eager_loads(&self, related_type: &str) -> Vec<String>;

    fn eager_load(
        &self,
        models: &mut [Model],
        relations: &[String],
    ) -> impl Future<Output = Result<(), FetchError>> + Send;
}
