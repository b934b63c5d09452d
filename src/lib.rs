pub mod client;
pub mod error;
pub mod models;
pub mod services;
pub mod sources;
pub mod utils;

pub use error::RagError;
pub use models::Config;
