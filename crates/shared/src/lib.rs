pub mod config;
mod config_env;
pub mod conversation;
pub mod fetch;
pub mod llm;
pub mod models;
