/// Columns selected by a relation going through another table: the explicitly selected ones
/// first, then the ones the relation requires that are not selected yet.
pub(super) fn merge_columns(selected: &[String], required: Vec<String>) -> Vec<String> {
    let mut columns = selected.to_vec();
    for column in required {
        if !columns.contains(&column) {
            columns.push(column);
        }
    }
    columns
}
