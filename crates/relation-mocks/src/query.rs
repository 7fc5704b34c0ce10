use std::cmp::Ordering;

use serde_json::{Map, Value};
use subgraph_engine::relation::{RelationDefinition, RelationQuery};

/// Relation query of [InMemoryProvider](crate::InMemoryProvider) over the related rows of a single parent.
#[derive(Debug, Clone, PartialEq)]
pub struct MockQuery {
    pub(crate) parent_type: String,
    pub(crate) relation: String,
    pub(crate) parent_key: Value,
    conditions: Vec<(String, Value)>,
    order_by: Option<(String, Order)>,
    window: Option<(u64, u64)>,
    columns: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl MockQuery {
    pub(crate) fn new(relation: &RelationDefinition, parent_key: Value) -> Self {
        MockQuery {
            parent_type: relation.parent_type.clone(),
            relation: relation.name.clone(),
            parent_key,
            conditions: Vec::new(),
            order_by: None,
            window: None,
            columns: Vec::new(),
        }
    }

    /// Keeps the rows whose `column` equals `value`.
    pub fn where_eq(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.conditions.push((column.into(), value.into()));
        self
    }

    pub fn order_by(&mut self, column: impl Into<String>, order: Order) -> &mut Self {
        self.order_by = Some((column.into(), order));
        self
    }

    pub fn parent_key(&self) -> &Value {
        &self.parent_key
    }

    pub fn window(&self) -> Option<(u64, u64)> {
        self.window
    }

    pub(crate) fn matches(&self, row: &Map<String, Value>) -> bool {
        self.conditions
            .iter()
            .all(|(column, value)| row.get(column) == Some(value))
    }

    pub(crate) fn sort<T>(&self, rows: &mut [T], row: impl Fn(&T) -> &Map<String, Value>) {
        let Some((column, order)) = &self.order_by else {
            return;
        };

        rows.sort_by(|a, b| {
            let ordering = compare(row(a).get(column), row(b).get(column));
            match order {
                Order::Asc => ordering,
                Order::Desc => ordering.reverse(),
            }
        });
    }

    pub(crate) fn apply_window<T>(&self, rows: Vec<T>) -> Vec<T> {
        match self.window {
            Some((offset, limit)) => rows
                .into_iter()
                .skip(usize::try_from(offset).unwrap_or(usize::MAX))
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .collect(),
            None => rows,
        }
    }
}

impl RelationQuery for MockQuery {
    fn for_page(&mut self, offset: u64, limit: u64) {
        self.window = Some((offset, limit));
    }

    fn selected_columns(&self) -> &[String] {
        &self.columns
    }

    fn select(&mut self, columns: Vec<String>) {
        self.columns = columns;
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
