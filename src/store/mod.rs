//! On-disk state: plan, config, tick history and the plan lock

pub mod config_store;
pub mod lock;
pub mod plan_store;
pub mod tick_log;

pub use config_store::ConfigStore;
pub use lock::PlanLock;
pub use plan_store::PlanStore;
pub use tick_log::{export_snapshot, TickLog};
