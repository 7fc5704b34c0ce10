use config::{PaginationConfig, PaginationType};
use error::{ErrorCode, GraphqlError};
use serde_json::Value;

use super::cursor;

/// Page requested for a paginated field: `per_page` items of page `page`, 1-based.
/// A negative `per_page` requests every item at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageArgs {
    page: u32,
    per_page: i32,
}

/// Rows to keep from an ordered result: `limit` rows after skipping `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationArgsError {
    #[error("The argument `first` is required.")]
    MissingFirst,
    #[error("Maximum number of {max} requested items exceeded, got {requested}. Fetch smaller chunks.")]
    TooManyItems { max: u32, requested: i64 },
    #[error("Requested pagination amount must be non-negative, got {0}.")]
    NegativeAmount(i64),
    #[error("Requested page must be at least 1, got {0}.")]
    InvalidPage(i64),
    #[error("The argument `{0}` must be an integer.")]
    NotAnInteger(&'static str),
    #[error("The argument `after` must be a valid cursor: {0}")]
    InvalidCursor(#[from] cursor::InvalidCursor),
}

impl From<PaginationArgsError> for GraphqlError {
    fn from(err: PaginationArgsError) -> Self {
        GraphqlError::new(err.to_string(), ErrorCode::BadRequest)
    }
}

impl PageArgs {
    /// Page numbers start at 1, a smaller page is treated as the first one.
    pub fn new(page: u32, per_page: i32) -> Self {
        PageArgs {
            page: page.max(1),
            per_page,
        }
    }

    /// Every item on a single page.
    pub fn all() -> Self {
        PageArgs { page: 1, per_page: -1 }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> i32 {
        self.per_page
    }

    pub fn is_all(&self) -> bool {
        self.per_page < 0
    }

    /// `None` when every item is requested.
    pub fn window(&self) -> Option<PageWindow> {
        let limit = u64::try_from(self.per_page).ok()?;
        Some(PageWindow {
            offset: u64::from(self.page - 1) * limit,
            limit,
        })
    }

    /// Reads the pagination arguments of a field: `first` and `page` for offset pagination,
    /// `first` and `after` for connections.
    pub fn extract(
        arguments: &Value,
        pagination_type: PaginationType,
        config: &PaginationConfig,
    ) -> Result<Self, PaginationArgsError> {
        let first = match integer_argument(arguments, "first")? {
            Some(first) => first,
            None => config
                .default_count
                .map(i64::from)
                .ok_or(PaginationArgsError::MissingFirst)?,
        };

        if let Some(max) = config.max_count {
            if first > i64::from(max) {
                return Err(PaginationArgsError::TooManyItems { max, requested: first });
            }
        }

        if first < 0 {
            return Err(PaginationArgsError::NegativeAmount(first));
        }
        let per_page = i32::try_from(first).map_err(|_| PaginationArgsError::NotAnInteger("first"))?;

        let page = if pagination_type.is_connection() {
            let after = match arguments.get("after") {
                Some(Value::String(after)) => cursor::decode(after)?,
                _ => 0,
            };
            current_page(u64::from(per_page.unsigned_abs()), after)
        } else {
            let page = integer_argument(arguments, "page")?.unwrap_or(1);
            if page < 1 {
                return Err(PaginationArgsError::InvalidPage(page));
            }
            u32::try_from(page).map_err(|_| PaginationArgsError::NotAnInteger("page"))?
        };

        Ok(PageArgs { page, per_page })
    }
}

/// The page following the item at position `after`.
fn current_page(first: u64, after: u64) -> u32 {
    if first == 0 || after == 0 {
        return 1;
    }
    u32::try_from((first + after) / first).unwrap_or(u32::MAX)
}

fn integer_argument(arguments: &Value, name: &'static str) -> Result<Option<i64>, PaginationArgsError> {
    match arguments.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_i64().map(Some).ok_or(PaginationArgsError::NotAnInteger(name)),
    }
}
