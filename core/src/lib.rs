pub mod config;
pub mod errors;
pub mod context;
pub mod model;
pub mod traits;
pub mod push;
pub mod storage;
pub mod ext;

#[cfg(test)]
mod testing;

pub use context::Context;
pub use config::Config;
pub use errors::ServiceResult as Result;
pub use errors::ServiceError as Error;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
