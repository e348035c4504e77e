pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod logger;
pub mod mcp;
pub mod models;
pub mod service;
pub mod store;
