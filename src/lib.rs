pub mod app;
pub mod auth;
pub mod config;
pub mod flash;
pub mod jobs;
pub mod payments;
pub mod state;
