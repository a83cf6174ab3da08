//! User and device queries.

use wakewire_core::unix_timestamp;

use super::db::RelayDatabase;
use super::models::{Device, User};
use wakewire_core::DatabaseError;

impl RelayDatabase {
    // =========================================================================
    // User queries
    // =========================================================================

    /// Create a new user.
    pub async fn create_user(
        &self,
        id: &str,
        username: &str,
        api_token: &str,
        plan: &str,
        devices_limit: i64,
    ) -> Result<User, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO users (id, username, api_token, plan, devices_limit, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(username)
        .bind(api_token)
        .bind(plan)
        .bind(devices_limit)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_user(id).await
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User {id}")))
    }

    /// Resolve a user from an API token. `None` means the credential is
    /// unknown; the caller maps that to a 401.
    pub async fn get_user_by_api_token(
        &self,
        api_token: &str,
    ) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE api_token = ?")
            .bind(api_token)
            .fetch_optional(self.pool())
            .await?;

        Ok(user)
    }

    /// Count all users (stats).
    pub async fn count_users(&self) -> Result<i64, DatabaseError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool())
            .await?;

        Ok(row.0)
    }

    // =========================================================================
    // Device queries
    // =========================================================================

    /// Register a device for a user.
    pub async fn create_device(
        &self,
        user_id: &str,
        device_id: &str,
        device_token: &str,
        device_data: &str,
    ) -> Result<Device, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO devices (device_id, device_token, user_id, cloud, added, device_data) VALUES (?, ?, ?, 1, ?, ?)",
        )
        .bind(device_id)
        .bind(device_token)
        .bind(user_id)
        .bind(now)
        .bind(device_data)
        .execute(self.pool())
        .await?;

        self.get_device_by_token(device_token)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Device {device_id}")))
    }

    /// Resolve a device from its token. `None` means the credential is
    /// unknown.
    pub async fn get_device_by_token(
        &self,
        device_token: &str,
    ) -> Result<Option<Device>, DatabaseError> {
        let device = sqlx::query_as::<_, Device>("SELECT * FROM devices WHERE device_token = ?")
            .bind(device_token)
            .fetch_optional(self.pool())
            .await?;

        Ok(device)
    }

    /// Find a user's device by its human-chosen id.
    pub async fn get_device_by_owner_and_id(
        &self,
        user_id: &str,
        device_id: &str,
    ) -> Result<Option<Device>, DatabaseError> {
        let device = sqlx::query_as::<_, Device>(
            "SELECT * FROM devices WHERE user_id = ? AND device_id = ?",
        )
        .bind(user_id)
        .bind(device_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(device)
    }

    /// List a user's devices, oldest registration first.
    pub async fn list_devices(&self, user_id: &str) -> Result<Vec<Device>, DatabaseError> {
        let devices =
            sqlx::query_as::<_, Device>("SELECT * FROM devices WHERE user_id = ? ORDER BY added ASC")
                .bind(user_id)
                .fetch_all(self.pool())
                .await?;

        Ok(devices)
    }

    /// Count a user's devices (registration limit enforcement).
    pub async fn count_devices(&self, user_id: &str) -> Result<i64, DatabaseError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM devices WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(self.pool())
            .await?;

        Ok(row.0)
    }

    /// Count all devices (stats).
    pub async fn count_devices_total(&self) -> Result<i64, DatabaseError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM devices")
            .fetch_one(self.pool())
            .await?;

        Ok(row.0)
    }

    /// Count devices seen at or after `cutoff` (stats: online devices).
    pub async fn count_devices_seen_since(&self, cutoff: i64) -> Result<i64, DatabaseError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM devices WHERE last_seen >= ?")
            .bind(cutoff)
            .fetch_one(self.pool())
            .await?;

        Ok(row.0)
    }

    /// Delete a device, but only if it belongs to `user_id`.
    pub async fn delete_device_owned(
        &self,
        user_id: &str,
        device_token: &str,
    ) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM devices WHERE user_id = ? AND device_token = ?")
            .bind(user_id)
            .bind(device_token)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
