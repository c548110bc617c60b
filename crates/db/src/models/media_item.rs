use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "media_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

/// Gallery entry shown under the card body
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, TS)]
pub struct MediaItem {
    pub id: Uuid,
    pub card_id: Uuid,
    pub kind: MediaKind,
    pub url: String,
    pub caption: Option<String>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateMediaItem {
    pub card_id: Uuid,
    pub kind: MediaKind,
    pub url: String,
    pub caption: Option<String>,
    pub display_order: i32,
}

const MEDIA_COLUMNS: &str = "id, card_id, kind, url, caption, display_order, created_at";

impl MediaItem {
    pub async fn find_by_card_id(pool: &SqlitePool, card_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {MEDIA_COLUMNS} FROM media_items WHERE card_id = $1 ORDER BY display_order ASC, created_at ASC"
        );
        sqlx::query_as::<_, MediaItem>(&sql)
            .bind(card_id)
            .fetch_all(pool)
            .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateMediaItem) -> Result<Self, sqlx::Error> {
        let sql = format!(
            r#"INSERT INTO media_items (id, card_id, kind, url, caption, display_order, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {MEDIA_COLUMNS}"#
        );
        sqlx::query_as::<_, MediaItem>(&sql)
            .bind(Uuid::new_v4())
            .bind(data.card_id)
            .bind(data.kind)
            .bind(&data.url)
            .bind(&data.caption)
            .bind(data.display_order)
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }
}
