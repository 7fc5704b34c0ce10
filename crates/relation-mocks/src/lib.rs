//! An in-memory relational store for tests of paginated relations.
//!
//! Rows live in named tables, each table holding the records of one model type. Relations are
//! declared between types, counted and fetched like a SQL database would: one `UNION ALL` per
//! [execute_union](RelationalQueryProvider::execute_union) call. Every round trip is recorded.

mod query;

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use serde_json::{Map, Value};
use subgraph_engine::relation::{
    FetchError, Model, RelationDefinition, RelationKind, RelationQuery, RelationValue, RelationalQueryProvider,
    THROUGH_KEY,
};

pub use query::{MockQuery, Order};

type Row = Map<String, Value>;

#[derive(Debug, Clone)]
enum Join {
    /// `related[foreign_key] == parent[local_key]`
    Direct,
    /// Join table rows with `parent_column == parent[local_key]` and `related_column == related[id]`.
    Pivot {
        table: String,
        parent_column: String,
        related_column: String,
    },
    /// Intermediate rows with `first_key == parent[local_key]` and `id == related[second_key]`.
    Through {
        through_type: String,
        first_key: String,
        second_key: String,
    },
}

#[derive(Debug, Clone)]
struct MockRelation {
    definition: RelationDefinition,
    join: Join,
}

/// Related row along the join table or intermediate row it was reached through.
struct Candidate<'a> {
    row: &'a Row,
    join: Option<(&'a str, &'a Row)>,
}

#[derive(Default)]
pub struct InMemoryProvider {
    /// table name -> rows
    tables: HashMap<String, Vec<Row>>,
    /// model type -> table name
    types: HashMap<String, String>,
    relations: Vec<MockRelation>,
    default_eager_loads: HashMap<String, Vec<String>>,
    union_executions: AtomicUsize,
    count_executions: AtomicUsize,
    executed_windows: Mutex<Vec<Option<(u64, u64)>>>,
    eager_loads: Mutex<Vec<(String, Vec<String>)>>,
    next_failure: Mutex<Option<FetchError>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table of `type_name` records. Values other than objects are ignored.
    #[must_use]
    pub fn with_table(
        mut self,
        table: impl Into<String>,
        type_name: impl Into<String>,
        rows: impl IntoIterator<Item = Value>,
    ) -> Self {
        let table = table.into();
        self.types.insert(type_name.into(), table.clone());
        self.tables.insert(table, objects(rows));
        self
    }

    /// Adds a join table, which holds no model.
    #[must_use]
    pub fn with_pivot_table(mut self, table: impl Into<String>, rows: impl IntoIterator<Item = Value>) -> Self {
        self.tables.insert(table.into(), objects(rows));
        self
    }

    #[must_use]
    pub fn has_many(
        self,
        parent_type: &str,
        name: &str,
        related_type: &str,
        foreign_key: &str,
    ) -> Self {
        let definition = RelationDefinition::new(name, parent_type, related_type, RelationKind::HasMany)
            .with_keys("id", foreign_key);
        self.with_relation(definition, Join::Direct)
    }

    /// Related rows are reached through the `pivot_table` rows of the parent. The pivot of each
    /// fetched row holds the pivot table columns.
    #[must_use]
    pub fn belongs_to_many(
        self,
        parent_type: &str,
        name: &str,
        related_type: &str,
        pivot_table: &str,
        parent_column: &str,
        related_column: &str,
    ) -> Self {
        let definition = RelationDefinition::new(name, parent_type, related_type, RelationKind::BelongsToMany)
            .with_keys("id", parent_column);
        self.with_relation(
            definition,
            Join::Pivot {
                table: pivot_table.to_string(),
                parent_column: parent_column.to_string(),
                related_column: related_column.to_string(),
            },
        )
    }

    /// Related rows are reached through the `through_type` records of the parent.
    #[must_use]
    pub fn has_many_through(
        self,
        parent_type: &str,
        name: &str,
        related_type: &str,
        through_type: &str,
        first_key: &str,
        second_key: &str,
    ) -> Self {
        let definition = RelationDefinition::new(name, parent_type, related_type, RelationKind::HasManyThrough);
        self.with_relation(
            definition,
            Join::Through {
                through_type: through_type.to_string(),
                first_key: first_key.to_string(),
                second_key: second_key.to_string(),
            },
        )
    }

    /// Relations loaded along every fetched record of `type_name`.
    #[must_use]
    pub fn with_default_eager_loads<S: Into<String>>(
        mut self,
        type_name: &str,
        relations: impl IntoIterator<Item = S>,
    ) -> Self {
        self.default_eager_loads
            .insert(type_name.to_string(), relations.into_iter().map(Into::into).collect());
        self
    }

    fn with_relation(mut self, definition: RelationDefinition, join: Join) -> Self {
        self.relations.push(MockRelation { definition, join });
        self
    }

    /// All records of `type_name`, in table order.
    pub fn models(&self, type_name: &str) -> Vec<Model> {
        self.types
            .get(type_name)
            .and_then(|table| self.tables.get(table))
            .map(|rows| {
                rows.iter()
                    .map(|row| Model::from_attributes(type_name, row.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The next count or fetch fails with `error`.
    pub fn fail_next_fetch(&self, error: FetchError) {
        *lock(&self.next_failure) = Some(error);
    }

    pub fn union_executions(&self) -> usize {
        self.union_executions.load(Ordering::Relaxed)
    }

    pub fn count_executions(&self) -> usize {
        self.count_executions.load(Ordering::Relaxed)
    }

    /// Window of every query executed as part of a union, in execution order.
    pub fn executed_windows(&self) -> Vec<Option<(u64, u64)>> {
        lock(&self.executed_windows).clone()
    }

    /// `(type_name, relations)` of every eager load, in order.
    pub fn eager_loads(&self) -> Vec<(String, Vec<String>)> {
        lock(&self.eager_loads).clone()
    }

    fn take_failure(&self) -> Result<(), FetchError> {
        match lock(&self.next_failure).take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn mock_relation(&self, parent_type: &str, name: &str) -> Result<&MockRelation, FetchError> {
        self.relations
            .iter()
            .find(|relation| relation.definition.parent_type == parent_type && relation.definition.name == name)
            .ok_or_else(|| FetchError::UnknownRelation {
                parent_type: parent_type.to_string(),
                relation: name.to_string(),
            })
    }

    fn rows_of(&self, type_name: &str) -> Result<&[Row], FetchError> {
        self.types
            .get(type_name)
            .and_then(|table| self.tables.get(table))
            .map(Vec::as_slice)
            .ok_or_else(|| FetchError::Query(format!("no table for type {type_name}")))
    }

    fn table_name<'a>(&'a self, type_name: &'a str) -> &'a str {
        self.types.get(type_name).map(String::as_str).unwrap_or(type_name)
    }

    /// Rows of the relation owned by the parent of `query`, filtered and ordered, ignoring the window.
    fn candidates(&self, query: &MockQuery) -> Result<Vec<Candidate<'_>>, FetchError> {
        let relation = self.mock_relation(&query.parent_type, &query.relation)?;
        let definition = &relation.definition;
        let related = self.rows_of(&definition.related_type)?;
        let parent_key = query.parent_key();

        let mut candidates = match &relation.join {
            Join::Direct => related
                .iter()
                .filter(|row| row.get(&definition.foreign_key) == Some(parent_key))
                .map(|row| Candidate { row, join: None })
                .collect::<Vec<_>>(),
            Join::Pivot {
                table,
                parent_column,
                related_column,
            } => {
                let pivots = self
                    .tables
                    .get(table)
                    .ok_or_else(|| FetchError::Query(format!("no pivot table {table}")))?;

                pivots
                    .iter()
                    .filter(|pivot| pivot.get(parent_column) == Some(parent_key))
                    .flat_map(move |pivot| {
                        related
                            .iter()
                            .filter(move |row| row.get("id").is_some() && row.get("id") == pivot.get(related_column))
                            .map(move |row| Candidate {
                                row,
                                join: Some((table.as_str(), pivot)),
                            })
                    })
                    .collect()
            }
            Join::Through {
                through_type,
                first_key,
                second_key,
            } => {
                let through_table = self.table_name(through_type);
                self.rows_of(through_type)?
                    .iter()
                    .filter(|through| through.get(first_key) == Some(parent_key))
                    .flat_map(move |through| {
                        related
                            .iter()
                            .filter(move |row| {
                                row.get(second_key).is_some() && row.get(second_key) == through.get("id")
                            })
                            .map(move |row| Candidate {
                                row,
                                join: Some((through_table, through)),
                            })
                    })
                    .collect()
            }
        };

        candidates.retain(|candidate| query.matches(candidate.row));
        query.sort(&mut candidates, |candidate| candidate.row);

        Ok(candidates)
    }

    /// Projects a candidate on the selected columns: `table.*`, `column` or
    /// `table.column as alias`, the latter also reading from the join row.
    fn project(&self, type_name: &str, candidate: &Candidate<'_>, columns: &[String]) -> Model {
        if columns.is_empty() {
            return Model::from_attributes(type_name, candidate.row.clone());
        }

        let mut attributes = Row::new();
        for column in columns {
            if column.ends_with(".*") {
                attributes.extend(candidate.row.iter().map(|(name, value)| (name.clone(), value.clone())));
                continue;
            }

            let (source, alias) = match column.split_once(" as ") {
                Some((source, alias)) => (source, alias),
                None => (column.as_str(), column.rsplit('.').next().unwrap_or(column)),
            };

            let value = match source.split_once('.') {
                Some((table, column)) => match candidate.join {
                    Some((join_table, join)) if join_table == table => join.get(column),
                    _ => candidate.row.get(column),
                },
                None => candidate.row.get(source),
            };

            if let Some(value) = value {
                attributes.insert(alias.to_string(), value.clone());
            }
        }

        Model::from_attributes(type_name, attributes)
    }

    fn eager_load_relation(&self, models: &mut [Model], name: &str) -> Result<(), FetchError> {
        for model in models.iter_mut() {
            let relation = self
                .relation(model.type_name(), name)
                .ok_or_else(|| FetchError::UnknownRelation {
                    parent_type: model.type_name().to_string(),
                    relation: name.to_string(),
                })?;

            let query = self.relation_query(model, &relation)?;
            let related = self
                .candidates(&query)?
                .iter()
                .map(|candidate| Model::from_attributes(&relation.related_type, candidate.row.clone()))
                .collect();

            model.set_relation(name, RelationValue::Collection(related));
        }

        Ok(())
    }
}

impl RelationalQueryProvider for InMemoryProvider {
    type Query = MockQuery;

    fn relation(&self, parent_type: &str, relation: &str) -> Option<RelationDefinition> {
        self.relations
            .iter()
            .find(|mock| mock.definition.parent_type == parent_type && mock.definition.name == relation)
            .map(|mock| mock.definition.clone())
    }

    fn relation_query(&self, parent: &Model, relation: &RelationDefinition) -> Result<MockQuery, FetchError> {
        let parent_key = relation.parent_key(parent).cloned().ok_or_else(|| {
            FetchError::Query(format!(
                "{} record without {} attribute",
                parent.type_name(),
                relation.local_key
            ))
        })?;

        Ok(MockQuery::new(relation, parent_key))
    }

    async fn count_related(
        &self,
        _relation: &RelationDefinition,
        queries: Vec<MockQuery>,
    ) -> Result<Vec<u64>, FetchError> {
        self.count_executions.fetch_add(1, Ordering::Relaxed);
        self.take_failure()?;

        let mut counts = Vec::with_capacity(queries.len());
        for query in &queries {
            counts.push(self.candidates(query)?.len() as u64);
        }

        Ok(counts)
    }

    async fn execute_union(
        &self,
        relation: &RelationDefinition,
        queries: Vec<MockQuery>,
    ) -> Result<Vec<Model>, FetchError> {
        self.union_executions.fetch_add(1, Ordering::Relaxed);
        self.take_failure()?;
        tracing::debug!("Executing a union of {} {} queries", queries.len(), relation.name);

        let mut rows = Vec::new();
        for query in &queries {
            let candidates = query.apply_window(self.candidates(query)?);
            rows.extend(
                candidates
                    .iter()
                    .map(|candidate| self.project(&relation.related_type, candidate, query.selected_columns())),
            );
        }

        lock(&self.executed_windows).extend(queries.iter().map(MockQuery::window));

        Ok(rows)
    }

    fn should_select_columns(&self, relation: &RelationDefinition) -> Vec<String> {
        let Some(mock) = self.relations.iter().find(|mock| mock.definition == *relation) else {
            return Vec::new();
        };
        let related_table = self.table_name(&relation.related_type);

        match &mock.join {
            Join::Direct => Vec::new(),
            Join::Pivot {
                table,
                parent_column,
                related_column,
            } => vec![
                format!("{related_table}.*"),
                format!("{table}.{parent_column} as pivot_{parent_column}"),
                format!("{table}.{related_column} as pivot_{related_column}"),
            ],
            Join::Through {
                through_type,
                first_key,
                ..
            } => vec![
                format!("{related_table}.*"),
                format!("{}.{first_key} as {THROUGH_KEY}", self.table_name(through_type)),
            ],
        }
    }

    fn default_eager_loads(&self, related_type: &str) -> Vec<String> {
        self.default_eager_loads.get(related_type).cloned().unwrap_or_default()
    }

    async fn eager_load(&self, models: &mut [Model], relations: &[String]) -> Result<(), FetchError> {
        if let Some(first) = models.first() {
            lock(&self.eager_loads).push((first.type_name().to_string(), relations.to_vec()));
        }

        for name in relations {
            self.eager_load_relation(models, name)?;
        }

        Ok(())
    }
}

fn objects(rows: impl IntoIterator<Item = Value>) -> Vec<Row> {
    rows.into_iter()
        .filter_map(|row| match row {
            Value::Object(row) => Some(row),
            _ => None,
        })
        .collect()
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
