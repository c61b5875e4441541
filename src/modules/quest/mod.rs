pub mod api;
pub mod engine;

pub use api::{ActionOutcome, QuestApi, QuestEndpoints};
pub use engine::{ItemOutcome, TaskEngine};
