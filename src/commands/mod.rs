pub mod runner;

pub use runner::{run_account, CycleStats, QuestRunner};
