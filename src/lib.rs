pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod similarity;
pub mod store;
