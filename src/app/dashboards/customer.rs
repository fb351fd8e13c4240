use super::lookup_passport;
use crate::core::poller::TransferOutcome;
use crate::core::session::{TransferHandle, TransferSession};
use crate::core::transfer::{PollPolicy, TransferJob};
use crate::core::{PassportApi, Result, TransferApi};
use crate::domain::model::Passport;
use crate::utils::error::DppError;
use crate::utils::validation::require_input;
use std::sync::Arc;

/// 顧客視圖：直接查詢或透過 EDC 連接器取得護照
pub struct CustomerDashboard<B: PassportApi + TransferApi + ?Sized + 'static> {
    backend: Arc<B>,
    session: TransferSession<B>,
    policy: PollPolicy,
}

impl<B: PassportApi + TransferApi + ?Sized + 'static> CustomerDashboard<B> {
    pub fn new(backend: Arc<B>, policy: PollPolicy) -> Self {
        Self {
            session: TransferSession::new(Arc::clone(&backend), policy),
            backend,
            policy,
        }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    pub async fn search_passport(&self, product_id: &str) -> Result<Passport> {
        lookup_passport(
            self.backend.as_ref(),
            product_id,
            "Failed to fetch product information",
        )
        .await
    }

    pub async fn search_by_serial(&self, serial_number: &str) -> Result<Passport> {
        let serial_number = require_input(serial_number, "Please enter a serial number")?;
        match self.backend.passport_by_serial(serial_number).await {
            Ok(passport) => Ok(passport),
            Err(DppError::NotFound { .. }) => Err(DppError::LookupError {
                message: "Product not found. Please check the serial number and try again."
                    .to_string(),
            }),
            Err(e) => {
                tracing::warn!("Serial lookup for {} failed: {}", serial_number, e);
                Err(DppError::LookupError {
                    message: "Failed to fetch product information".to_string(),
                })
            }
        }
    }

    /// 啟動 EDC 傳輸；會取消先前尚未完成的傳輸
    pub fn start_edc_transfer(&mut self, product_id: &str) -> Result<TransferHandle> {
        self.session.start(product_id)
    }

    pub fn cancel_edc_transfer(&mut self) -> bool {
        self.session.cancel()
    }

    pub fn current_transfer(&self) -> Option<TransferJob> {
        self.session.current()
    }

    /// Run a transfer to its end, reporting every observed state change.
    pub async fn retrieve_via_edc<F>(
        &mut self,
        product_id: &str,
        mut on_progress: F,
    ) -> Result<TransferOutcome>
    where
        F: FnMut(&TransferJob),
    {
        let handle = self.session.start(product_id)?;
        let mut progress = handle.progress();

        loop {
            let job = progress.borrow_and_update().clone();
            on_progress(&job);
            if !job.is_loading() || progress.changed().await.is_err() {
                break;
            }
        }

        handle.wait().await
    }
}
