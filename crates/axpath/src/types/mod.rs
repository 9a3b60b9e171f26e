/*! Core types for axpath.

Regenerate TypeScript types: `cargo test -p axpath export_bindings`
*/

#![allow(missing_docs)]

mod error;
mod geometry;
mod status;

pub use error::{AxpathError, AxpathResult, ProviderError, QueryError};
pub use geometry::BoundingBox;
pub use status::Status;
