use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::FeeCollectError;
use crate::traits::FeeCollector;
use crate::types::FeeReceipt;

/// Mock fee collector for testing. Serves scripted results, then `Disabled`.
#[derive(Clone, Default)]
pub struct MockFeeCollector {
    script: Arc<Mutex<VecDeque<Result<FeeReceipt, FeeCollectError>>>>,
    calls: Arc<AtomicUsize>,
}

impl MockFeeCollector {
    pub fn new(results: Vec<Result<FeeReceipt, FeeCollectError>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(results.into())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeeCollector for MockFeeCollector {
    fn name(&self) -> &'static str {
        "mock-fee-collector"
    }

    async fn collect(&self) -> Result<FeeReceipt, FeeCollectError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or(Err(FeeCollectError::Disabled))
    }
}
