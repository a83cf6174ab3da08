//! Message queue queries: push, destructive pull, retention cleanup.

use wakewire_core::unix_timestamp;

use super::db::RelayDatabase;
use super::models::Message;
use wakewire_core::DatabaseError;

impl RelayDatabase {
    /// Append one message to a device's mailbox. No deduplication.
    pub async fn push_message(
        &self,
        device_token: &str,
        device_id: &str,
        message_type: &str,
        message_data: &str,
        direction: &str,
    ) -> Result<i64, DatabaseError> {
        let now = unix_timestamp();

        let result = sqlx::query(
            "INSERT INTO messages (device_token, device_id, message_type, message_data, direction, timestamp) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(device_token)
        .bind(device_id)
        .bind(message_type)
        .bind(message_data)
        .bind(direction)
        .bind(now)
        .execute(self.pool())
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Destructive read of every `to_device` message for a token, FIFO.
    ///
    /// One transaction covers the liveness update, the ordered select,
    /// and the delete of exactly the selected rows. Deleting by the
    /// selected ids (not by re-running the filter) means a message
    /// pushed while this transaction runs can neither be lost nor
    /// double-delivered; it simply waits for the next pull.
    ///
    /// Second-resolution timestamps collide under load, so the FIFO
    /// order is `(timestamp, id)`.
    pub async fn pull_messages(&self, device_token: &str) -> Result<Vec<Message>, DatabaseError> {
        let now = unix_timestamp();
        let mut tx = self.pool().begin().await?;

        sqlx::query(
            "UPDATE devices SET last_seen = ?, poll_count = poll_count + 1 WHERE device_token = ?",
        )
        .bind(now)
        .bind(device_token)
        .execute(&mut *tx)
        .await?;

        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE device_token = ? AND direction = 'to_device' ORDER BY timestamp ASC, id ASC",
        )
        .bind(device_token)
        .fetch_all(&mut *tx)
        .await?;

        for message in &messages {
            sqlx::query("DELETE FROM messages WHERE id = ?")
                .bind(message.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(messages)
    }

    /// Remove every message older than `cutoff` (seconds since epoch),
    /// regardless of direction or whether it was ever pulled.
    pub async fn delete_messages_older_than(&self, cutoff: i64) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM messages WHERE timestamp < ?")
            .bind(cutoff)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected())
    }

    /// Count queued messages in one direction (stats).
    pub async fn count_messages_by_direction(
        &self,
        direction: &str,
    ) -> Result<i64, DatabaseError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages WHERE direction = ?")
            .bind(direction)
            .fetch_one(self.pool())
            .await?;

        Ok(row.0)
    }
}
