pub mod dashboards;
pub mod render;

pub use dashboards::{CustomerDashboard, OperatorDashboard, RepairShopDashboard};
