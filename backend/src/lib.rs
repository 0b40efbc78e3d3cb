pub mod api;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod pricing;
pub mod quote;
pub mod scheduler;
pub mod store;
