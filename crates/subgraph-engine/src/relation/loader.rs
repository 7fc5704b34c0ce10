use std::collections::HashMap;

use tracing::Instrument as _;

use super::{
    FetchError, Model, QueryDecorator, RelationDefinition, RelationKind, RelationQuery, RelationalQueryProvider,
    columns::merge_columns,
    pivot::hydrate_pivot,
    reattach::{self, dictionary_key},
};
use crate::pagination::PageArgs;

/// Rows of a relation fetched for a collection of parents.
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedCollection {
    pub relation: RelationDefinition,
    /// Rows of every parent, in the order the union returned them.
    pub rows: Vec<Model>,
    /// Total number of related rows of each parent, ignoring pagination, in the order of the parents.
    pub counts: Vec<u64>,
}

/// Loads one page of a to-many relation for each parent of a collection in a single round trip.
///
/// A query is built for every parent and paged on its own, then all of them are executed as one
/// `UNION ALL`. A plain relation query would share its `LIMIT` between all parents.
pub struct PaginatedRelationLoader<'a, P, D> {
    provider: &'a P,
    relation_name: String,
    page_args: PageArgs,
    decorator: D,
}

impl<'a, P, D> PaginatedRelationLoader<'a, P, D>
where
    P: RelationalQueryProvider,
    D: QueryDecorator<P::Query>,
{
    pub fn new(provider: &'a P, relation_name: impl Into<String>, page_args: PageArgs, decorator: D) -> Self {
        PaginatedRelationLoader {
            provider,
            relation_name: relation_name.into(),
            page_args,
            decorator,
        }
    }

    /// Sets the relation of every parent to its page of related rows.
    ///
    /// Panics if `parents` is empty.
    pub async fn load(&self, parents: &mut [Model]) -> Result<(), FetchError> {
        let span = tracing::info_span!(
            "paginated_relation_load",
            relation = %self.relation_name,
            parents = parents.len(),
            page = self.page_args.page(),
            per_page = self.page_args.per_page(),
        );

        async {
            let related = self.load_related(parents).await?;
            reattach::attach(parents, related, self.page_args);
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Fetches the related rows of all `parents` without attaching them.
    ///
    /// Panics if `parents` is empty.
    pub async fn load_related(&self, parents: &[Model]) -> Result<RelatedCollection, FetchError> {
        assert!(
            !parents.is_empty(),
            "cannot load the {} relation of an empty collection",
            self.relation_name
        );

        let parent_type = parents[0].type_name();
        let relation = self
            .provider
            .relation(parent_type, &self.relation_name)
            .ok_or_else(|| FetchError::UnknownRelation {
                parent_type: parent_type.to_string(),
                relation: self.relation_name.clone(),
            })?;

        let (distinct, owners) = distinct_parents(parents, &relation);
        if distinct.len() < parents.len() {
            tracing::debug!(
                "{} of {} parents share their key for the {} relation",
                parents.len() - distinct.len(),
                parents.len(),
                relation.name
            );
        }

        let distinct_counts = self.count_related(&distinct, &relation).await?;
        let counts: Vec<u64> = owners.iter().map(|&owner| distinct_counts[owner]).collect();

        let queries = distinct
            .iter()
            .map(|parent| self.page_query(parent, &relation))
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows = self
            .provider
            .execute_union(&relation, queries)
            .await
            .inspect_err(|err| tracing::error!("Failed to fetch the {} relation: {err}", relation.name))?;

        tracing::debug!(
            "Fetched {} {} rows for {} parents",
            rows.len(),
            relation.related_type,
            distinct.len()
        );

        if relation.kind == RelationKind::BelongsToMany {
            rows.iter_mut().for_each(hydrate_pivot);
        }

        self.load_default_eager_loads(&relation, &mut rows).await?;

        Ok(RelatedCollection { relation, rows, counts })
    }

    async fn count_related(&self, parents: &[&Model], relation: &RelationDefinition) -> Result<Vec<u64>, FetchError> {
        let queries = parents
            .iter()
            .map(|&parent| self.decorated_query(parent, relation))
            .collect::<Result<Vec<_>, _>>()?;

        let counts = self.provider.count_related(relation, queries).await?;
        if counts.len() != parents.len() {
            tracing::error!(
                "Received {} counts for {} parents of the {} relation",
                counts.len(),
                parents.len(),
                relation.name
            );
            return Err(FetchError::Query(format!(
                "counting the {} relation returned {} results for {} parents",
                relation.name,
                counts.len(),
                parents.len()
            )));
        }

        Ok(counts)
    }

    fn decorated_query(&self, parent: &Model, relation: &RelationDefinition) -> Result<P::Query, FetchError> {
        let mut query = self.provider.relation_query(parent, relation)?;
        self.decorator.decorate(&mut query, parent);
        Ok(query)
    }

    fn page_query(&self, parent: &Model, relation: &RelationDefinition) -> Result<P::Query, FetchError> {
        let mut query = self.decorated_query(parent, relation)?;

        if relation.joins_through() {
            let columns = merge_columns(query.selected_columns(), self.provider.should_select_columns(relation));
            query.select(columns);
        }

        if let Some(window) = self.page_args.window() {
            query.for_page(window.offset, window.limit);
        }

        Ok(query)
    }

    /// Only the default eager loads the rows don't have yet. Rows of a relation share their
    /// type, so the first one stands for all of them.
    async fn load_default_eager_loads(
        &self,
        relation: &RelationDefinition,
        rows: &mut [Model],
    ) -> Result<(), FetchError> {
        let Some(first) = rows.first() else {
            return Ok(());
        };

        let unloaded = self
            .provider
            .default_eager_loads(&relation.related_type)
            .into_iter()
            .filter(|eager_load| !first.relation_loaded(eager_load))
            .collect::<Vec<_>>();

        if unloaded.is_empty() {
            return Ok(());
        }

        tracing::debug!("Eager loading {unloaded:?} on {} rows", relation.related_type);
        self.provider.eager_load(rows, &unloaded).await
    }
}

/// The first parent of every distinct key, and for each parent the position of its key among them.
/// Parents sharing a key own the same rows, so their relation is fetched once.
fn distinct_parents<'p>(parents: &'p [Model], relation: &RelationDefinition) -> (Vec<&'p Model>, Vec<usize>) {
    let mut positions: HashMap<Option<String>, usize> = HashMap::new();
    let mut distinct = Vec::new();

    let owners = parents
        .iter()
        .map(|parent| {
            let key = relation.parent_key(parent).map(dictionary_key);
            *positions.entry(key).or_insert_with(|| {
                distinct.push(parent);
                distinct.len() - 1
            })
        })
        .collect();

    (distinct, owners)
}
