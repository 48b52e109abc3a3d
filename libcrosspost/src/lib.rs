//! Crosspost - publish one post to many social platforms
//!
//! This library provides the core of a multi-platform publishing
//! pipeline: platform connectors, content validation, connection health,
//! concurrent fan-out publishing, and post lifecycle persistence.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod platforms;
pub mod publisher;
pub mod registry;
pub mod store;
pub mod types;
pub mod validator;

// Re-export commonly used types
pub use config::Config;
pub use error::{CrosspostError, Result};
pub use lifecycle::Lifecycle;
pub use publisher::{BulkEntry, BulkReport, Publisher};
pub use registry::{ConnectionRegistry, ConnectionStatus};
pub use store::{PostStore, SqliteStore};
pub use types::{Platform, PostStatus, PublishReport, SocialPost};
