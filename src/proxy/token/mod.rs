pub mod lifecycle;
pub mod loader;
pub mod persistence;

pub use lifecycle::{TokenLifecycle, TokenStatus};
pub use loader::accounts_from_tokens;
pub use persistence::TokenStore;
