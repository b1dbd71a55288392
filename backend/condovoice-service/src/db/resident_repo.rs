use super::ResidentStore;
use crate::error::{AppError, Result};
use crate::models::Resident;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

const RESIDENT_COLUMNS: &str = r#"
    id, email, password_hash, name, phone, apt_number, avatar, card_color,
    residency, move_in_date, created_at, updated_at
"#;

#[derive(FromRow)]
struct ResidentRow {
    id: Uuid,
    email: String,
    password_hash: String,
    name: Option<String>,
    phone: Option<String>,
    apt_number: Option<String>,
    avatar: Option<String>,
    card_color: Option<String>,
    residency: String,
    move_in_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ResidentRow> for Resident {
    type Error = AppError;

    fn try_from(row: ResidentRow) -> Result<Self> {
        Ok(Resident {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            name: row.name,
            phone: row.phone,
            apt_number: row.apt_number,
            avatar: row.avatar,
            card_color: row.card_color,
            residency: row.residency.parse().map_err(AppError::Database)?,
            move_in_date: row.move_in_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct PgResidentStore {
    pool: PgPool,
}

impl PgResidentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ResidentStore for PgResidentStore {
    async fn insert_resident(&self, resident: &Resident) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO residents (id, email, password_hash, name, phone, apt_number, avatar,
                                   card_color, residency, move_in_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(resident.id)
        .bind(&resident.email)
        .bind(&resident.password_hash)
        .bind(&resident.name)
        .bind(&resident.phone)
        .bind(&resident.apt_number)
        .bind(&resident.avatar)
        .bind(&resident.card_color)
        .bind(resident.residency.as_str())
        .bind(resident.move_in_date)
        .bind(resident.created_at)
        .bind(resident.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AppError::Conflict("Email already registered".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Resident>> {
        let row = sqlx::query_as::<_, ResidentRow>(&format!(
            "SELECT {} FROM residents WHERE id = $1",
            RESIDENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Resident::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Resident>> {
        let row = sqlx::query_as::<_, ResidentRow>(&format!(
            "SELECT {} FROM residents WHERE email = $1",
            RESIDENT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Resident::try_from).transpose()
    }

    async fn list_residents(&self) -> Result<Vec<Resident>> {
        let rows = sqlx::query_as::<_, ResidentRow>(&format!(
            "SELECT {} FROM residents",
            RESIDENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Resident::try_from).collect()
    }

    async fn update_resident(&self, resident: &Resident) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE residents
            SET name = $2, phone = $3, apt_number = $4, avatar = $5, card_color = $6,
                residency = $7, move_in_date = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(resident.id)
        .bind(&resident.name)
        .bind(&resident.phone)
        .bind(&resident.apt_number)
        .bind(&resident.avatar)
        .bind(&resident.card_color)
        .bind(resident.residency.as_str())
        .bind(resident.move_in_date)
        .bind(resident.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
