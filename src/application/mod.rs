// Application layer - use cases and orchestration over the stores.

pub mod credentials;
pub mod error;
pub mod service;

pub use credentials::*;
pub use error::*;
pub use service::*;
