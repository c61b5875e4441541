pub mod auth;
pub mod quest;
pub mod system;
