pub mod cli;
pub mod config;
pub mod entities;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;
pub mod stores;
pub mod telemetry;
