use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tourops_common::{TourQuery, TourRecord};
use uuid::Uuid;

use crate::db::TourRepository;

const COLUMNS: &str = "id, start_date, invoice, language, name, pax, group_id, dnr, td, agent, \
    arrival, departure, accommodation, gears, snowshoe, nlt, city_tour, hiking, fishing, \
    dog_sledging, snowmobile_atv, aurora_village, payment, reservation_number, remarks";

pub struct PgTourRepository {
    pool: PgPool,
}

impl PgTourRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or overwrite every column of a tour. Returns rows affected.
    async fn write(&self, tour: &TourRecord, insert: bool) -> Result<u64> {
        let sql = if insert {
            format!(
                r#"
                INSERT INTO tours ({COLUMNS})
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                        $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25)
                "#
            )
        } else {
            r#"
            UPDATE tours SET
                start_date = $2, invoice = $3, language = $4, name = $5, pax = $6,
                group_id = $7, dnr = $8, td = $9, agent = $10, arrival = $11,
                departure = $12, accommodation = $13, gears = $14, snowshoe = $15,
                nlt = $16, city_tour = $17, hiking = $18, fishing = $19,
                dog_sledging = $20, snowmobile_atv = $21, aurora_village = $22,
                payment = $23, reservation_number = $24, remarks = $25,
                updated_at = now()
            WHERE id = $1
            "#
            .to_string()
        };

        let result = sqlx::query(&sql)
            .bind(tour.id)
            .bind(tour.start_date)
            .bind(&tour.invoice)
            .bind(&tour.language)
            .bind(&tour.name)
            .bind(tour.pax)
            .bind(&tour.group_id)
            .bind(&tour.dnr)
            .bind(&tour.td)
            .bind(&tour.agent)
            .bind(&tour.arrival)
            .bind(&tour.departure)
            .bind(&tour.accommodation)
            .bind(&tour.gears)
            .bind(&tour.snowshoe)
            .bind(&tour.nlt)
            .bind(&tour.city_tour)
            .bind(&tour.hiking)
            .bind(&tour.fishing)
            .bind(&tour.dog_sledging)
            .bind(&tour.snowmobile_atv)
            .bind(&tour.aurora_village)
            .bind(&tour.payment)
            .bind(&tour.reservation_number)
            .bind(&tour.remarks)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl TourRepository for PgTourRepository {
    async fn search(&self, query: &TourQuery) -> Result<Vec<TourRecord>> {
        let sql = format!(
            r#"
            SELECT {COLUMNS}
            FROM tours
            WHERE ($1::date IS NULL OR start_date >= $1)
              AND ($2::date IS NULL OR start_date <= $2)
              AND ($3::text IS NULL OR invoice ILIKE '%' || $3 || '%')
              AND ($4::text IS NULL OR name ILIKE '%' || $4 || '%')
            ORDER BY start_date ASC
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(query.date_from)
            .bind(query.date_to)
            .bind(query.invoice.as_deref())
            .bind(query.name.as_deref())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_tour).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<TourRecord>> {
        let sql = format!("SELECT {COLUMNS} FROM tours WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_tour).transpose()
    }

    async fn create(&self, tour: &TourRecord) -> Result<()> {
        self.write(tour, true).await?;
        Ok(())
    }

    async fn update(&self, tour: &TourRecord) -> Result<bool> {
        Ok(self.write(tour, false).await? > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tours WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_tour(row: &PgRow) -> Result<TourRecord> {
    Ok(TourRecord {
        id: row.try_get("id")?,
        start_date: row.try_get("start_date")?,
        invoice: row.try_get("invoice")?,
        language: row.try_get("language")?,
        name: row.try_get("name")?,
        pax: row.try_get("pax")?,
        group_id: row.try_get("group_id")?,
        dnr: row.try_get("dnr")?,
        td: row.try_get("td")?,
        agent: row.try_get("agent")?,
        arrival: row.try_get("arrival")?,
        departure: row.try_get("departure")?,
        accommodation: row.try_get("accommodation")?,
        gears: row.try_get("gears")?,
        snowshoe: row.try_get("snowshoe")?,
        nlt: row.try_get("nlt")?,
        city_tour: row.try_get("city_tour")?,
        hiking: row.try_get("hiking")?,
        fishing: row.try_get("fishing")?,
        dog_sledging: row.try_get("dog_sledging")?,
        snowmobile_atv: row.try_get("snowmobile_atv")?,
        aurora_village: row.try_get("aurora_village")?,
        payment: row.try_get("payment")?,
        reservation_number: row.try_get("reservation_number")?,
        remarks: row.try_get("remarks")?,
    })
}
