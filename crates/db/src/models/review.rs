use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// Testimonial left on a card. Only approved reviews are shown publicly.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, TS)]
pub struct Review {
    pub id: Uuid,
    pub card_id: Uuid,
    pub reviewer_name: String,
    pub rating: i32, // 1..=5
    pub comment: Option<String>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateReview {
    pub card_id: Uuid,
    pub reviewer_name: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub is_approved: bool,
}

const REVIEW_COLUMNS: &str = "id, card_id, reviewer_name, rating, comment, is_approved, created_at";

impl Review {
    pub async fn find_by_card_id(pool: &SqlitePool, card_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE card_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Review>(&sql)
            .bind(card_id)
            .fetch_all(pool)
            .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateReview) -> Result<Self, sqlx::Error> {
        let sql = format!(
            r#"INSERT INTO reviews (id, card_id, reviewer_name, rating, comment, is_approved, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {REVIEW_COLUMNS}"#
        );
        sqlx::query_as::<_, Review>(&sql)
            .bind(Uuid::new_v4())
            .bind(data.card_id)
            .bind(&data.reviewer_name)
            .bind(data.rating.clamp(1, 5))
            .bind(&data.comment)
            .bind(data.is_approved)
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }
}
