//! EDC Transfer State Machine
//!
//! `Initiated → Checking → {Complete | Failed}`. `Checking` loops once per
//! polling cycle. The job value is the only state; loading is derived from it.

use crate::core::ConfigProvider;
use crate::domain::model::DataTransfer;
use crate::utils::error::{DppError, Result};
use crate::utils::validation::require_input;
use std::fmt;
use std::time::Duration;

pub const MAX_ATTEMPTS: u32 = 10;
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferStatus {
    /// Initiation request in flight
    Initiated,
    /// Polling by reference id
    Checking,
    /// Terminal: passport received
    Complete,
    /// Terminal: initiation, status check, payload, timeout or cancel failure
    Failed,
}

impl TransferStatus {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Complete | TransferStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Initiated => "initiated",
            TransferStatus::Checking => "checking",
            TransferStatus::Complete => "complete",
            TransferStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            interval: POLL_INTERVAL,
        }
    }
}

impl PollPolicy {
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            max_attempts: config.max_attempts(),
            interval: config.poll_interval(),
        }
    }
}

/// What the poller must do on entering `Checking`
#[derive(Debug)]
pub enum PollAction {
    Query { reference_id: String, attempt: u32 },
    GiveUp(DppError),
}

/// Result of feeding one status response into the job
#[derive(Debug)]
pub enum PollStep {
    Retry { next_attempt: u32, delay: Duration },
    Complete(serde_json::Value),
    Failed(DppError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferJob {
    product_id: String,
    reference_id: Option<String>,
    attempt: u32,
    status: TransferStatus,
    error: Option<String>,
}

impl TransferJob {
    /// 驗證產品 ID 並建立 `Initiated` 狀態的工作；空白 ID 直接失敗
    pub fn new(product_id: &str) -> Result<Self> {
        let product_id = require_input(product_id, "Please enter a product ID")?;
        Ok(Self {
            product_id: product_id.to_string(),
            reference_id: None,
            attempt: 0,
            status: TransferStatus::Initiated,
            error: None,
        })
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn reference_id(&self) -> Option<&str> {
        self.reference_id.as_deref()
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn status(&self) -> TransferStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        !self.status.is_terminal()
    }

    /// 初始化成功：`Initiated → Checking`，從第 1 次嘗試開始
    pub fn start_checking(&mut self, reference_id: String) {
        if self.status != TransferStatus::Initiated {
            return;
        }
        self.reference_id = Some(reference_id);
        self.attempt = 1;
        self.status = TransferStatus::Checking;
    }

    /// Terminal failure; no-op once the job is already terminal.
    pub fn fail(&mut self, error: &DppError) {
        if self.status.is_terminal() {
            return;
        }
        self.error = Some(error.to_string());
        self.status = TransferStatus::Failed;
    }

    pub fn begin_attempt(&mut self, policy: &PollPolicy) -> PollAction {
        let reference_id = match (&self.reference_id, self.status) {
            (Some(reference_id), TransferStatus::Checking) => reference_id.clone(),
            _ => {
                return PollAction::GiveUp(DppError::validation(format!(
                    "Transfer is {}, not checking",
                    self.status
                )))
            }
        };

        if self.attempt > policy.max_attempts {
            let error = DppError::TimeoutError {
                attempts: policy.max_attempts,
            };
            self.fail(&error);
            return PollAction::GiveUp(error);
        }

        PollAction::Query {
            reference_id,
            attempt: self.attempt,
        }
    }

    /// 處理一次狀態查詢結果。空結果排程下一次；有結果取最後一筆
    pub fn apply(&mut self, result: Result<Vec<DataTransfer>>, policy: &PollPolicy) -> PollStep {
        let transfers = match result {
            Ok(transfers) => transfers,
            Err(error) => {
                self.fail(&error);
                return PollStep::Failed(error);
            }
        };

        let Some(latest) = transfers.last() else {
            self.attempt += 1;
            return PollStep::Retry {
                next_attempt: self.attempt,
                delay: policy.interval,
            };
        };

        match serde_json::from_str::<serde_json::Value>(&latest.json_data) {
            Ok(passport) => {
                self.status = TransferStatus::Complete;
                PollStep::Complete(passport)
            }
            Err(e) => {
                let error = DppError::PayloadError {
                    message: e.to_string(),
                };
                self.fail(&error);
                PollStep::Failed(error)
            }
        }
    }
}
