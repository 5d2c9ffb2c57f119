pub mod app;
pub mod config;
pub mod constants;
pub mod keyring;
pub mod memory;
pub mod message;
pub mod model_adapter;
