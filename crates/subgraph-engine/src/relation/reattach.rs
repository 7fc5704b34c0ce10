use std::collections::HashMap;

use serde_json::Value;

use super::{Model, RelatedCollection, RelationValue};
use crate::pagination::{Page, PageArgs};

/// Sets the relation slot of every parent to the page of rows it owns. The page total is the
/// counted number of related rows of the parent, not the size of the page.
pub fn attach(parents: &mut [Model], related: RelatedCollection, page_args: PageArgs) {
    let RelatedCollection { relation, rows, counts } = related;

    let mut dictionary: HashMap<String, Vec<Model>> = HashMap::new();
    for row in rows {
        match relation.related_key(&row).map(dictionary_key) {
            Some(key) => dictionary.entry(key).or_default().push(row),
            None => tracing::debug!(
                "Dropping a {} row without owner key for the {} relation",
                relation.related_type,
                relation.name
            ),
        }
    }

    for (parent, total_count) in parents.iter_mut().zip(counts) {
        let items = relation
            .parent_key(parent)
            .map(dictionary_key)
            .and_then(|key| dictionary.get(&key).cloned())
            .unwrap_or_default();

        parent.set_relation(
            relation.name.clone(),
            RelationValue::Page(Page::new(items, total_count, page_args)),
        );
    }
}

/// Keys compare by their string form, so `1` and `"1"` are the same key.
pub(super) fn dictionary_key(value: &Value) -> String {
    match value {
        Value::String(value) => value.clone(),
        other => other.to_string(),
    }
}
