// History endpoints: saving a finished remix and listing saved ones.

use tracing::debug;

use crate::client::RemixClient;
use crate::error::Error;
use crate::models::{HistoryEntry, HistoryEnvelope, SaveRemixBody};

impl RemixClient {
    /// Store a finished remix in the logged-in account's history.
    pub async fn save_remix(
        &self,
        original_text: &str,
        remixed_text: &str,
        remix_type: &str,
    ) -> Result<(), Error> {
        let body = SaveRemixBody {
            original_text,
            remixed_text,
            remix_type,
        };
        let _: serde_json::Value = self.post_json("save_remix", &body).await?;
        debug!(remix_type, "remix saved");
        Ok(())
    }

    /// Saved remixes, newest first as the backend orders them.
    pub async fn history(&self) -> Result<Vec<HistoryEntry>, Error> {
        let envelope: Option<HistoryEnvelope> = self.get_json("get_history").await?;
        let entries = envelope.map(HistoryEnvelope::into_entries).unwrap_or_default();
        debug!(count = entries.len(), "history fetched");
        Ok(entries)
    }
}
