use serde_json::Map;

use super::{Model, PIVOT_PREFIX};

/// Moves the join table columns of a fetched belongs-to-many row, selected as `pivot_<column>`,
/// into its pivot. Rows without such columns are left as they are.
pub(super) fn hydrate_pivot(model: &mut Model) {
    if !model.attributes().keys().any(|name| name.starts_with(PIVOT_PREFIX)) {
        return;
    }

    let mut pivot = Map::new();
    let attributes = std::mem::take(model.attributes_mut());
    for (name, value) in attributes {
        match name.strip_prefix(PIVOT_PREFIX) {
            Some(column) => {
                pivot.insert(column.to_string(), value);
            }
            None => {
                model.attributes_mut().insert(name, value);
            }
        }
    }

    model.set_pivot(pivot);
}
