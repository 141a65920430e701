pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod migrate;
pub mod response;
pub mod state;
pub mod storage;
pub mod tasks;
pub mod telemetry;
pub mod users;
