use super::{lookup_passport, repair_failed, validate_repair};
use crate::core::{PassportApi, Result};
use crate::domain::model::{NewRepairEntry, Passport};
use crate::utils::error::DppError;
use crate::utils::validation::require_input;
use std::sync::Arc;
use std::time::Duration;

pub struct RepairShopDashboard<B: PassportApi + ?Sized> {
    backend: Arc<B>,
    refresh_delay: Duration,
}

impl<B: PassportApi + ?Sized> RepairShopDashboard<B> {
    pub fn new(backend: Arc<B>, refresh_delay: Duration) -> Self {
        Self {
            backend,
            refresh_delay,
        }
    }

    pub async fn search_passport(&self, id: &str) -> Result<Passport> {
        lookup_passport(self.backend.as_ref(), id, "Failed to fetch product details").await
    }

    /// 新增維修紀錄，稍候後重新讀取護照以取得完整歷史
    pub async fn add_repair(&self, passport_id: &str, form: &NewRepairEntry) -> Result<Passport> {
        let raw_id = require_input(passport_id, "Please enter a product ID")?;
        let id: i64 = raw_id
            .parse()
            .map_err(|_| DppError::validation(format!("Invalid passport ID: {}", raw_id)))?;
        let repair = validate_repair(form)?;

        self.backend
            .add_repair(id, &repair)
            .await
            .map_err(repair_failed)?;
        tracing::info!("🔧 Repair logged on passport #{}", id);

        if !self.refresh_delay.is_zero() {
            tokio::time::sleep(self.refresh_delay).await;
        }
        self.search_passport(raw_id).await
    }
}
