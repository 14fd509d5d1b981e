use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::SnapshotError;
use crate::traits::SnapshotSource;

/// Mock snapshot source for testing.
///
/// Serves scripted results in order, then repeats `fallback` once the script
/// runs out. Counts calls and records the token addresses it was asked for.
#[derive(Clone)]
pub struct MockSnapshot {
    script: Arc<Mutex<VecDeque<Result<Vec<String>, SnapshotError>>>>,
    fallback: Vec<String>,
    calls: Arc<AtomicUsize>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl MockSnapshot {
    /// Always answer with `holders`.
    pub fn new(holders: Vec<String>) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback: holders,
            calls: Arc::new(AtomicUsize::new(0)),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer with `results` in order, then with an empty list.
    pub fn scripted(results: Vec<Result<Vec<String>, SnapshotError>>) -> Self {
        let mock = Self::new(Vec::new());
        *mock.script.lock().unwrap() = results.into();
        mock
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl Default for MockSnapshot {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl SnapshotSource for MockSnapshot {
    fn name(&self) -> &'static str {
        "mock-snapshot"
    }

    async fn fetch(&self, token_address: &str) -> Result<Vec<String>, SnapshotError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested
            .lock()
            .unwrap()
            .push(token_address.to_string());

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => Ok(self.fallback.clone()),
        }
    }
}
