pub mod client;
pub mod header_policy;
pub mod retry;

pub use client::{CallExecutor, CallRequest};
pub use retry::{CallError, CallFailure, RetryPolicy};
