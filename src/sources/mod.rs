//! Job source module
//!
//! Defines the SourceProvider trait and provides a registry for all job sources.

mod loader;
mod registry;
mod remote;
mod traits;

pub use loader::SourceLoader;
pub use registry::SourceRegistry;
pub use remote::RemoteSource;
pub use traits::*;
