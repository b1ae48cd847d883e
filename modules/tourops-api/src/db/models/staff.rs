use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tourops_common::StaffMember;
use uuid::Uuid;

use crate::db::StaffRepository;

type StaffRow = (Uuid, String, String, String, String, DateTime<Utc>);

pub struct PgStaffRepository {
    pool: PgPool,
}

impl PgStaffRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StaffRepository for PgStaffRepository {
    async fn list(&self) -> Result<Vec<StaffMember>> {
        let rows = sqlx::query_as::<_, StaffRow>(
            r#"
            SELECT id, email, first_name, last_name, role, created_at
            FROM staff
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_staff).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<StaffMember>> {
        let row = sqlx::query_as::<_, StaffRow>(
            r#"
            SELECT id, email, first_name, last_name, role, created_at
            FROM staff
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_staff))
    }

    async fn create(&self, staff: &StaffMember) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO staff (id, email, first_name, last_name, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(staff.id)
        .bind(&staff.email)
        .bind(&staff.first_name)
        .bind(&staff.last_name)
        .bind(&staff.role)
        .bind(staff.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, staff: &StaffMember) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE staff
            SET email = $2, first_name = $3, last_name = $4, role = $5
            WHERE id = $1
            "#,
        )
        .bind(staff.id)
        .bind(&staff.email)
        .bind(&staff.first_name)
        .bind(&staff.last_name)
        .bind(&staff.role)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM staff WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_staff(row: StaffRow) -> StaffMember {
    let (id, email, first_name, last_name, role, created_at) = row;
    StaffMember {
        id,
        email,
        first_name,
        last_name,
        role,
        created_at,
    }
}
