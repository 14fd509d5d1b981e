use anyhow::Result;
use chrono::{DateTime, Utc};
use rocksdb::{Options, DB};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::config::{DEFAULT_BREAK_SECS, DEFAULT_TOKEN_ADDRESS};
use crate::types::ArenaDocument;

/// Key under which the whole document lives.
pub const DOCUMENT_KEY: &[u8] = b"arena/document";

/// Values used when the store has to synthesize a fresh document.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    pub token_address: String,
    pub break_secs: u64,
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self {
            token_address: DEFAULT_TOKEN_ADDRESS.to_string(),
            break_secs: DEFAULT_BREAK_SECS,
        }
    }
}

/// Whole-document store on RocksDB.
///
/// There is no compare-and-swap; callers serialize load/mutate/save themselves.
pub struct StateStore {
    db: Arc<DB>,
    bootstrap: Bootstrap,
}

impl StateStore {
    pub fn open(path: &str, bootstrap: Bootstrap) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path)?;
        Ok(Self {
            db: Arc::new(db),
            bootstrap,
        })
    }

    /// Load the persisted document.
    ///
    /// A missing or undecodable value is replaced by a default document, which
    /// is persisted before returning so repeated loads agree. Read errors from
    /// the database propagate.
    pub fn load(&self, now: DateTime<Utc>) -> Result<ArenaDocument> {
        match self.db.get(DOCUMENT_KEY)? {
            Some(raw) => match serde_json::from_slice::<ArenaDocument>(&raw) {
                Ok(doc) => return Ok(doc),
                Err(e) => warn!("Stored document is unreadable, bootstrapping: {}", e),
            },
            None => debug!("No stored document, bootstrapping"),
        }

        let doc = ArenaDocument::bootstrap(
            &self.bootstrap.token_address,
            self.bootstrap.break_secs,
            now,
        );
        if let Err(e) = self.save(&doc) {
            error!("Failed to persist bootstrap document: {}", e);
        }
        Ok(doc)
    }

    /// Overwrite the whole document.
    pub fn save(&self, doc: &ArenaDocument) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        self.db.put(DOCUMENT_KEY, bytes)?;
        Ok(())
    }
}
