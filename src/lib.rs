pub mod analysts;
pub mod analytics;
pub mod auth;
pub mod config;
pub mod enrich;
pub mod envelope;
pub mod errors;
pub mod filter;
pub mod http;
pub mod models;
pub mod pagination;
pub mod panel;
pub mod session;
pub mod state;
pub mod stats;
pub mod storage;
pub mod system;
pub mod upload;

pub use config::ClientConfig;
pub use errors::{ApiError, ServiceError, ServiceResult};
pub use state::ApiContext;
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
