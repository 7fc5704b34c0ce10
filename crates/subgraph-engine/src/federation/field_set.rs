use std::str::FromStr;

use cynic_parser::executable as ast;
use serde_json::{Map, Value};

/// A set of fields from a `@key(fields: "...")` directive, e.g. `id organization { id }`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSet(Vec<Selection>);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub field: String,
    pub selections: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldSetParseError {
    #[error("a field set must select at least one field")]
    Empty,
    #[error("Could not parse the field set: {0}")]
    InvalidFieldSet(String),
    #[error("fragments cannot be used inside a field set")]
    Fragment,
    #[error("field '{0}' of a field set cannot have an alias, arguments or directives")]
    UnsupportedField(String),
}

impl FieldSet {
    pub fn new(selections: impl IntoIterator<Item = Selection>) -> Self {
        FieldSet(selections.into_iter().collect())
    }

    pub fn selections(&self) -> &[Selection] {
        &self.0
    }

    /// Whether the object contains a non-null value for every field of this set, recursing
    /// into nested selections.
    pub fn is_satisfied_by(&self, object: &Map<String, Value>) -> bool {
        selections_are_satisfied(object, &self.0)
    }
}

impl Selection {
    pub fn leaf(field: impl Into<String>) -> Self {
        Selection {
            field: field.into(),
            selections: Vec::new(),
        }
    }

    pub fn nested(field: impl Into<String>, selections: impl IntoIterator<Item = Selection>) -> Self {
        Selection {
            field: field.into(),
            selections: selections.into_iter().collect(),
        }
    }
}

fn selections_are_satisfied(object: &Map<String, Value>, selections: &[Selection]) -> bool {
    selections.iter().all(|selection| match object.get(&selection.field) {
        None | Some(Value::Null) => false,
        Some(_) if selection.selections.is_empty() => true,
        Some(Value::Object(nested)) => selections_are_satisfied(nested, &selection.selections),
        Some(_) => false,
    })
}

impl FromStr for FieldSet {
    type Err = FieldSetParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.trim_matches(|c: char| c.is_whitespace() || c == ',').is_empty() {
            return Err(FieldSetParseError::Empty);
        }

        let fields = format!("{{ {input} }}");
        let doc = cynic_parser::parse_executable_document(&fields)
            .map_err(|err| FieldSetParseError::InvalidFieldSet(err.to_string()))?;

        let mut operations = doc.operations();
        let (Some(operation), None) = (operations.next(), operations.next()) else {
            return Err(FieldSetParseError::InvalidFieldSet("a field set is a single selection set".to_string()));
        };

        convert_selection_set(operation.selection_set()).map(FieldSet)
    }
}

fn convert_selection_set<'a>(set: ast::iter::Iter<'a, ast::Selection<'a>>) -> Result<Vec<Selection>, FieldSetParseError> {
    set.map(|selection| match selection {
        ast::Selection::Field(field) => {
            if field.alias().is_some() || field.arguments().next().is_some() || field.directives().next().is_some() {
                return Err(FieldSetParseError::UnsupportedField(field.name().to_string()));
            }
            Ok(Selection::nested(field.name(), convert_selection_set(field.selection_set())?))
        }
        ast::Selection::InlineFragment(_) | ast::Selection::FragmentSpread(_) => Err(FieldSetParseError::Fragment),
    })
    .collect()
}

impl std::fmt::Display for FieldSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, selection) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, " ")?;
            }
            write!(f, "{selection}")?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Selection { field, selections } = self;
        write!(f, "{field}")?;
        if !selections.is_empty() {
            write!(f, " {{")?;
            for selection in selections {
                write!(f, " {selection}")?;
            }
            write!(f, " }}")?;
        }
        Ok(())
    }
}
