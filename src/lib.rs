pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{HttpBackend, LocalStorage};
pub use app::{CustomerDashboard, OperatorDashboard, RepairShopDashboard};
pub use config::DashboardConfig;
pub use crate::core::{poller::TransferWorkflow, session::TransferSession, transfer::PollPolicy};
pub use utils::error::{DppError, Result};
