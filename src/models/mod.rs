pub mod account;
pub mod config;
pub mod quest;

pub use account::{Account, AccountReport};
pub use config::{AppConfig, RetryConfig, ScheduleConfig, TimeoutConfig};
pub use quest::{Balance, ItemId, PartnerOffer, PartnerStatus, Task, TaskStatus, UserInfo};
