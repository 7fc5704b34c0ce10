//! Paginated to-many relations: one page of related rows per parent, fetched for a whole
//! collection of parents at once.

mod columns;
mod decorator;
mod loader;
mod model;
mod pivot;
mod provider;
mod reattach;

pub use decorator::{NoDecoration, QueryDecorator};
pub use loader::{PaginatedRelationLoader, RelatedCollection};
pub use model::{Model, RelationValue};
pub use provider::{
    FetchError, PIVOT_PREFIX, RelationDefinition, RelationKind, RelationQuery, RelationalQueryProvider, THROUGH_KEY,
};
pub use reattach::attach;
