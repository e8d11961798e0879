pub mod cli;
pub mod client;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod server;
pub mod service;
pub mod transport;
pub mod vault;
