pub mod config;
pub mod errors;
pub mod logging;
pub mod nlp;
pub mod query;
pub mod resolver;
pub mod server;
pub mod store;
