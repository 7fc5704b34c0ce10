//! Resolution of the [apollo federation][1] `_entities` root field.
//!
//! [1]: https://www.apollographql.com/docs/federation/subgraph-spec

mod engine;
mod entity;
mod field_set;
mod registry;
mod representation;
mod response;

pub use engine::{EntityResolutionEngine, EntityResult};
pub use entity::{EntityDefinition, EntitySchema, EntitySchemaBuilder};
pub use field_set::{FieldSet, FieldSetParseError, Selection};
pub use registry::{
    BatchFn, BatchedEntityResolver, EntityResolverError, EntityResolverRegistry, ResolverCapability,
    SingleEntityResolver,
};
pub use representation::{Representation, RepresentationError, TYPENAME_FIELD};
pub use response::{ENTITIES_FIELD, EntitiesResponse, REPRESENTATIONS_ARGUMENT, representations_argument};
