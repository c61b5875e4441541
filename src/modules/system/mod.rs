pub mod account_context;
pub mod config;
pub mod logger;
pub mod prompt;
pub mod scheduler;
pub mod validation;
