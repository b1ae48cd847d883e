use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use tourops_itinerary::{ScheduleOverlay, ScheduleRepository};
use uuid::Uuid;

/// Overlays stored as JSONB in `tour_schedules`, one row per tour. Rows go
/// away with their tour through the foreign key.
pub struct PgScheduleRepository {
    pool: PgPool,
}

impl PgScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleRepository for PgScheduleRepository {
    async fn load(&self, tour_id: Uuid) -> Result<Option<ScheduleOverlay>> {
        let value = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT schedule FROM tour_schedules WHERE tour_id = $1",
        )
        .bind(tour_id)
        .fetch_optional(&self.pool)
        .await?;

        match value {
            Some(v) => Ok(Some(serde_json::from_value(v)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, tour_id: Uuid, overlay: &ScheduleOverlay) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tour_schedules (tour_id, schedule, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (tour_id) DO UPDATE
                SET schedule = EXCLUDED.schedule,
                    updated_at = now()
            "#,
        )
        .bind(tour_id)
        .bind(serde_json::to_value(overlay)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
