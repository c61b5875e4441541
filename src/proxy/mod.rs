pub mod config;
pub mod proxy_pool;
pub mod token;
pub mod upstream;

pub use config::{ProxyMode, ProxySource};
pub use proxy_pool::ProxyPool;
