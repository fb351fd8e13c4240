//! Transfer Workflow
//!
//! Drives a [`TransferJob`] against a [`TransferApi`]: one initiation call,
//! then status polls on a fixed interval. Every wait and every call is raced
//! against the cancel token.

use crate::core::session::CancelToken;
use crate::core::transfer::{PollAction, PollPolicy, PollStep, TransferJob};
use crate::core::TransferApi;
use crate::utils::error::{DppError, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct TransferOutcome {
    pub product_id: String,
    pub reference_id: String,
    pub attempts: u32,
    /// 傳輸取得的護照內容，原樣交給呈現層
    pub passport: serde_json::Value,
}

pub struct TransferWorkflow<A: TransferApi + ?Sized> {
    api: Arc<A>,
    policy: PollPolicy,
}

impl<A: TransferApi + ?Sized> TransferWorkflow<A> {
    pub fn new(api: Arc<A>, policy: PollPolicy) -> Self {
        Self { api, policy }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Validate, initiate and poll to completion without external cancellation.
    pub async fn run(&self, product_id: &str) -> Result<TransferOutcome> {
        let mut job = TransferJob::new(product_id)?;
        let (progress, _) = watch::channel(job.clone());
        self.execute(&mut job, &mut CancelToken::never(), &progress)
            .await
    }

    pub async fn execute(
        &self,
        job: &mut TransferJob,
        cancel: &mut CancelToken,
        progress: &watch::Sender<TransferJob>,
    ) -> Result<TransferOutcome> {
        progress.send_replace(job.clone());
        info!("🚀 Initiating EDC transfer for product {}", job.product_id());

        let product_id = job.product_id().to_string();
        let initiated = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = self.api.initiate_transfer(&product_id) => Some(result),
        };

        match initiated {
            None => return Err(abort(job, progress)),
            Some(Ok(initiation)) if !initiation.reference_id.trim().is_empty() => {
                debug!("Transfer reference id: {}", initiation.reference_id);
                job.start_checking(initiation.reference_id);
            }
            Some(Ok(_)) => {
                warn!("Initiation response carried an empty reference id");
                let error = DppError::TransferInitiationError {
                    message: "Failed to initiate EDC transfer".to_string(),
                };
                return Err(finish_failed(job, progress, error));
            }
            Some(Err(error)) => return Err(finish_failed(job, progress, error)),
        }

        self.poll(job, cancel, progress).await
    }

    /// 輪詢直到完成、失敗、逾時或取消
    pub async fn poll(
        &self,
        job: &mut TransferJob,
        cancel: &mut CancelToken,
        progress: &watch::Sender<TransferJob>,
    ) -> Result<TransferOutcome> {
        loop {
            let (reference_id, attempt) = match job.begin_attempt(&self.policy) {
                PollAction::Query {
                    reference_id,
                    attempt,
                } => (reference_id, attempt),
                PollAction::GiveUp(error) => {
                    warn!("❌ Transfer for {} stopped: {}", job.product_id(), error);
                    progress.send_replace(job.clone());
                    return Err(error);
                }
            };

            progress.send_replace(job.clone());
            debug!(
                "Checking transfer {} (attempt {}/{})",
                reference_id, attempt, self.policy.max_attempts
            );

            let polled = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = self.api.transfers_by_reference(&reference_id) => Some(result),
            };
            let Some(result) = polled else {
                return Err(abort(job, progress));
            };

            match job.apply(result, &self.policy) {
                PollStep::Retry {
                    next_attempt,
                    delay,
                } => {
                    debug!("No data yet, next attempt {} in {:?}", next_attempt, delay);
                    let cancelled = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => true,
                        _ = tokio::time::sleep(delay) => false,
                    };
                    if cancelled {
                        return Err(abort(job, progress));
                    }
                }
                PollStep::Complete(passport) => {
                    info!(
                        "✅ Transfer {} complete after {} attempt(s)",
                        reference_id, attempt
                    );
                    progress.send_replace(job.clone());
                    return Ok(TransferOutcome {
                        product_id: job.product_id().to_string(),
                        reference_id,
                        attempts: attempt,
                        passport,
                    });
                }
                PollStep::Failed(error) => {
                    warn!("❌ Transfer {} failed: {}", reference_id, error);
                    progress.send_replace(job.clone());
                    return Err(error);
                }
            }
        }
    }
}

fn finish_failed(
    job: &mut TransferJob,
    progress: &watch::Sender<TransferJob>,
    error: DppError,
) -> DppError {
    warn!("❌ Transfer for {} failed: {}", job.product_id(), error);
    job.fail(&error);
    progress.send_replace(job.clone());
    error
}

fn abort(job: &mut TransferJob, progress: &watch::Sender<TransferJob>) -> DppError {
    info!("Transfer for {} cancelled", job.product_id());
    job.fail(&DppError::Cancelled);
    progress.send_replace(job.clone());
    DppError::Cancelled
}
