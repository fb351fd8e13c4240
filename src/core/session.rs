//! Transfer Session
//!
//! Owns at most one in-flight EDC transfer. Starting a new transfer, calling
//! `cancel`, or dropping the session cancels the previous one.

use crate::core::poller::{TransferOutcome, TransferWorkflow};
use crate::core::transfer::{PollPolicy, TransferJob};
use crate::core::TransferApi;
use crate::utils::error::{DppError, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Receiving side of a cancel signal
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: Option<watch::Receiver<bool>>,
}

impl CancelToken {
    /// A token that is never cancelled
    pub fn never() -> Self {
        Self { rx: None }
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolves once cancelled. Pends forever if the handle is gone without cancelling.
    pub async fn cancelled(&mut self) {
        match self.rx.as_mut() {
            Some(rx) => {
                let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
                if closed {
                    std::future::pending::<()>().await;
                }
            }
            None => std::future::pending::<()>().await,
        }
    }
}

#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx: Some(rx) })
}

/// 呼叫端持有：觀察進度並等待結果
pub struct TransferHandle {
    progress: watch::Receiver<TransferJob>,
    task: JoinHandle<Result<TransferOutcome>>,
}

impl TransferHandle {
    pub fn progress(&self) -> watch::Receiver<TransferJob> {
        self.progress.clone()
    }

    pub fn snapshot(&self) -> TransferJob {
        self.progress.borrow().clone()
    }

    pub async fn wait(self) -> Result<TransferOutcome> {
        match self.task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(DppError::Cancelled),
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        }
    }
}

struct ActiveTransfer {
    cancel: CancelHandle,
    progress: watch::Receiver<TransferJob>,
}

pub struct TransferSession<A: TransferApi + ?Sized + 'static> {
    workflow: Arc<TransferWorkflow<A>>,
    active: Option<ActiveTransfer>,
}

impl<A: TransferApi + ?Sized + 'static> TransferSession<A> {
    pub fn new(api: Arc<A>, policy: PollPolicy) -> Self {
        Self {
            workflow: Arc::new(TransferWorkflow::new(api, policy)),
            active: None,
        }
    }

    /// 啟動傳輸。ID 驗證在產生任務前同步完成，失敗時不影響進行中的傳輸
    pub fn start(&mut self, product_id: &str) -> Result<TransferHandle> {
        let mut job = TransferJob::new(product_id)?;

        if self.cancel() {
            tracing::info!("Previous transfer cancelled by new request for {}", job.product_id());
        }

        let (cancel, mut token) = cancel_pair();
        let (progress_tx, progress_rx) = watch::channel(job.clone());
        let workflow = Arc::clone(&self.workflow);

        let task = tokio::spawn(async move {
            workflow.execute(&mut job, &mut token, &progress_tx).await
        });

        self.active = Some(ActiveTransfer {
            cancel,
            progress: progress_rx.clone(),
        });

        Ok(TransferHandle {
            progress: progress_rx,
            task,
        })
    }

    /// Cancel the in-flight transfer. Returns whether one was still running.
    pub fn cancel(&mut self) -> bool {
        match self.active.take() {
            Some(active) => {
                let running = active.progress.borrow().is_loading();
                active.cancel.cancel();
                running
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.progress.borrow().is_loading())
    }

    pub fn current(&self) -> Option<TransferJob> {
        self.active
            .as_ref()
            .map(|active| active.progress.borrow().clone())
    }
}

impl<A: TransferApi + ?Sized + 'static> Drop for TransferSession<A> {
    fn drop(&mut self) {
        self.cancel();
    }
}
