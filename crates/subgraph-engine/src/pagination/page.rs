use config::PaginationType;
use serde::Serialize;
use serde_json::{Value, json};

use super::{PageArgs, cursor};

/// One page of a paginated list together with the metadata the paginator types expose.
///
/// `total_count` is the number of items of the whole list, independent of the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub per_page: i32,
    pub current_page: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: u64, args: PageArgs) -> Self {
        Page {
            items,
            total_count,
            per_page: args.per_page(),
            current_page: args.page(),
        }
    }

    /// Number of items on this page.
    pub fn count(&self) -> u64 {
        self.items.len() as u64
    }

    /// Page size reported to clients. Without pagination, the page is all there is.
    pub fn page_size(&self) -> u64 {
        u64::try_from(self.per_page).unwrap_or_else(|_| self.count())
    }

    pub fn last_page(&self) -> u64 {
        if self.per_page <= 0 {
            return 1;
        }
        self.total_count.div_ceil(self.page_size()).max(1)
    }

    pub fn has_more_pages(&self) -> bool {
        u64::from(self.current_page) < self.last_page()
    }

    /// 1-based position of the first item of the page in the full list.
    pub fn first_item(&self) -> Option<u64> {
        if self.items.is_empty() {
            return None;
        }
        Some(u64::from(self.current_page - 1) * self.page_size() + 1)
    }

    pub fn last_item(&self) -> Option<u64> {
        self.first_item().map(|first| first + self.count() - 1)
    }
}

impl<T: Serialize> Page<T> {
    /// Renders the page as the generated paginator type of `pagination_type` would be.
    pub fn to_value(&self, pagination_type: PaginationType) -> Result<Value, serde_json::Error> {
        match pagination_type {
            PaginationType::Paginator => Ok(json!({
                "data": serde_json::to_value(&self.items)?,
                "paginatorInfo": {
                    "count": self.count(),
                    "currentPage": self.current_page,
                    "firstItem": self.first_item(),
                    "hasMorePages": self.has_more_pages(),
                    "lastItem": self.last_item(),
                    "lastPage": self.last_page(),
                    "perPage": self.page_size(),
                    "total": self.total_count,
                }
            })),
            PaginationType::Simple => Ok(json!({
                "data": serde_json::to_value(&self.items)?,
                "paginatorInfo": {
                    "count": self.count(),
                    "currentPage": self.current_page,
                    "firstItem": self.first_item(),
                    "lastItem": self.last_item(),
                    "perPage": self.page_size(),
                    "hasMorePages": self.has_more_pages(),
                }
            })),
            PaginationType::Connection => self.connection(),
        }
    }

    fn connection(&self) -> Result<Value, serde_json::Error> {
        let first = self.first_item().unwrap_or(1);
        let edges = self
            .items
            .iter()
            .zip(first..)
            .map(|(node, position)| {
                Ok(json!({
                    "node": serde_json::to_value(node)?,
                    "cursor": cursor::encode(position),
                }))
            })
            .collect::<Result<Vec<_>, serde_json::Error>>()?;

        Ok(json!({
            "edges": edges,
            "pageInfo": {
                "hasNextPage": self.has_more_pages(),
                "hasPreviousPage": self.current_page > 1,
                "startCursor": self.first_item().map(cursor::encode),
                "endCursor": self.last_item().map(cursor::encode),
                "total": self.total_count,
                "count": self.count(),
                "currentPage": self.current_page,
                "lastPage": self.last_page(),
            }
        }))
    }
}
