//! Paginated fields: page arguments, generated paginator types and their rendering.

mod args;
pub mod cursor;
mod page;
mod registration;

pub use args::{PageArgs, PageWindow, PaginationArgsError};
pub use config::{InvalidPaginationType, PaginationConfig, PaginationType};
pub use page::Page;
pub use registration::PaginatedField;
