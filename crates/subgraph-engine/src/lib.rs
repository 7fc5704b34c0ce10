#![deny(clippy::future_not_send, unused_crate_dependencies)]

pub mod federation;
pub mod pagination;
pub mod relation;

pub use config::{Config, ConfigError, LogLevel};
pub use error::{ErrorCode, ErrorPath, ErrorPathSegment, GraphqlError, GraphqlResult};
