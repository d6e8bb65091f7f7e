//! `KeyUpdate` -> `DbPatchable` implementation.
//!
//! This sits in the `db` module because it contains SQL/table knowledge.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::db::patch::{DbPatchable, KeyPatch, KeyUpdate};
use crate::error::ForgeError;

#[async_trait]
impl DbPatchable for KeyUpdate {
    async fn apply_patch(&self, pool: &SqlitePool) -> Result<(), ForgeError> {
        let KeyPatch {
            active,
            daily_usage,
            last_reset,
        } = self.patch.clone();

        let active_set = active.is_some();
        let usage_set = daily_usage.is_some();
        let reset_set = last_reset.is_some();
        let updated_at = Utc::now();

        let res = sqlx::query(
            r"
            UPDATE api_keys
            SET
                active = COALESCE(?, active),
                daily_usage = COALESCE(?, daily_usage),
                last_reset = COALESCE(?, last_reset),
                updated_at = ?
            WHERE id = ?
            ",
        )
        .bind(active)
        .bind(daily_usage)
        .bind(last_reset)
        .bind(updated_at)
        .bind(self.id)
        .execute(pool)
        .await?;

        let affected = res.rows_affected();
        debug!(
            table = "api_keys",
            id = self.id,
            affected,
            updated_at = %updated_at,
            active_set,
            usage_set,
            reset_set,
            "db patch applied"
        );

        if affected == 0 {
            return Err(ForgeError::KeyNotFound(self.id));
        }
        Ok(())
    }
}
