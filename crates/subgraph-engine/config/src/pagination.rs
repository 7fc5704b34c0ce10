#[derive(Debug, Default, serde::Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PaginationConfig {
    /// Page size used when a paginated field is queried without `first`.
    pub default_count: Option<u32>,
    /// Upper bound for `first`.
    pub max_count: Option<u32>,
    /// Marks generated paginator results as non-null.
    pub non_null_pagination_results: bool,
    pub default_type: PaginationType,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationType {
    /// Offset based, with the total count of items.
    #[default]
    Paginator,
    /// Offset based, without the last page.
    Simple,
    /// Cursor based, following the relay connection specification.
    Connection,
}

impl PaginationType {
    pub fn is_connection(self) -> bool {
        matches!(self, PaginationType::Connection)
    }

    /// Suffix of the generated result type, e.g. `UserPaginator`.
    pub fn type_suffix(self) -> &'static str {
        match self {
            PaginationType::Paginator => "Paginator",
            PaginationType::Simple => "SimplePaginator",
            PaginationType::Connection => "Connection",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(r#""{0}" is not a valid pagination type (expected one of paginator, simple, connection)."#)]
pub struct InvalidPaginationType(pub String);

impl std::str::FromStr for PaginationType {
    type Err = InvalidPaginationType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "paginator" | "default" => Ok(PaginationType::Paginator),
            "simple" => Ok(PaginationType::Simple),
            "connection" | "relay" => Ok(PaginationType::Connection),
            _ => Err(InvalidPaginationType(s.to_string())),
        }
    }
}
