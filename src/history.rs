use crate::types::{ArenaDocument, HistoryItem};

impl ArenaDocument {
    /// Record a settled round. History is newest-first and never trimmed.
    pub fn record_history(&mut self, item: HistoryItem) {
        self.history.insert(0, item);
    }

    pub fn latest_history(&self) -> Option<&HistoryItem> {
        self.history.first()
    }

    /// Newest-first page of history.
    pub fn history_page(&self, offset: usize, limit: usize) -> &[HistoryItem] {
        let start = offset.min(self.history.len());
        let end = start.saturating_add(limit).min(self.history.len());
        &self.history[start..end]
    }
}
