use config::{InvalidPaginationType, PaginationConfig, PaginationType};
use serde_json::Value;

use super::{Page, PageArgs, PaginationArgsError};

/// A list field turned into a paginated one at schema-build time.
///
/// ```text
/// users: [User!]! @paginate(type: CONNECTION)
/// ```
///
/// becomes a `users(first: Int!, after: String): UserConnection` field.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedField {
    item_type: String,
    pagination_type: PaginationType,
    config: PaginationConfig,
}

impl PaginatedField {
    /// Without an explicit type, the configured default type is used.
    pub fn register(
        item_type: impl Into<String>,
        pagination_type: Option<PaginationType>,
        config: &PaginationConfig,
    ) -> Self {
        PaginatedField {
            item_type: item_type.into(),
            pagination_type: pagination_type.unwrap_or(config.default_type),
            config: config.clone(),
        }
    }

    /// Registers the field from the raw `type` argument of the pagination directive.
    pub fn from_directive_argument(
        item_type: impl Into<String>,
        pagination_type: Option<&str>,
        config: &PaginationConfig,
    ) -> Result<Self, InvalidPaginationType> {
        let pagination_type = pagination_type.map(str::parse::<PaginationType>).transpose()?;

        Ok(Self::register(item_type, pagination_type, config))
    }

    /// Per field override of the configured `default_count`.
    pub fn with_default_count(mut self, default_count: u32) -> Self {
        self.config.default_count = Some(default_count);
        self
    }

    /// Per field override of the configured `max_count`.
    pub fn with_max_count(mut self, max_count: u32) -> Self {
        self.config.max_count = Some(max_count);
        self
    }

    pub fn pagination_type(&self) -> PaginationType {
        self.pagination_type
    }

    pub fn item_type(&self) -> &str {
        &self.item_type
    }

    /// Name of the generated result type, e.g. `UserPaginator`.
    pub fn type_name(&self) -> String {
        format!("{}{}", self.item_type, self.pagination_type.type_suffix())
    }

    /// Name of the generated edge type, connections only.
    pub fn edge_type_name(&self) -> Option<String> {
        self.pagination_type
            .is_connection()
            .then(|| format!("{}Edge", self.item_type))
    }

    pub fn is_non_null(&self) -> bool {
        self.config.non_null_pagination_results
    }

    /// Type of the field in the generated schema: `UserPaginator!` or `UserPaginator`.
    pub fn field_type(&self) -> String {
        if self.is_non_null() {
            format!("{}!", self.type_name())
        } else {
            self.type_name()
        }
    }

    pub fn default_count(&self) -> Option<u32> {
        self.config.default_count
    }

    pub fn max_count(&self) -> Option<u32> {
        self.config.max_count
    }

    pub fn extract_page_args(&self, arguments: &Value) -> Result<PageArgs, PaginationArgsError> {
        PageArgs::extract(arguments, self.pagination_type, &self.config)
    }

    pub fn render<T: serde::Serialize>(&self, page: &Page<T>) -> Result<Value, serde_json::Error> {
        page.to_value(self.pagination_type)
    }
}
