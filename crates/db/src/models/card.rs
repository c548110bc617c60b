use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumIter, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Named color palette applied to the rendered card.
#[derive(
    Debug,
    Clone,
    Copy,
    Type,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    TS,
    EnumString,
    EnumIter,
    Display,
    Default,
)]
#[sqlx(type_name = "card_theme", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CardTheme {
    #[default]
    Classic,
    Ocean,
    Sunset,
    Forest,
    Midnight,
    Rose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemePalette {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub background: &'static str,
    pub text: &'static str,
}

impl CardTheme {
    pub fn palette(self) -> ThemePalette {
        let (primary, secondary, background, text) = match self {
            CardTheme::Classic => ("#1f2937", "#6b7280", "#ffffff", "#111827"),
            CardTheme::Ocean => ("#0369a1", "#38bdf8", "#f0f9ff", "#0c4a6e"),
            CardTheme::Sunset => ("#ea580c", "#f59e0b", "#fff7ed", "#7c2d12"),
            CardTheme::Forest => ("#15803d", "#84cc16", "#f0fdf4", "#14532d"),
            CardTheme::Midnight => ("#6366f1", "#a78bfa", "#0f172a", "#f8fafc"),
            CardTheme::Rose => ("#e11d48", "#fb7185", "#fff1f2", "#881337"),
        };
        ThemePalette {
            primary,
            secondary,
            background,
            text,
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Type,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    TS,
    EnumString,
    EnumIter,
    Display,
    Default,
)]
#[sqlx(type_name = "card_shape", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CardShape {
    Rectangle,
    #[default]
    Rounded,
    Circle,
    Hexagon,
}

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "layout_style", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LayoutStyle {
    #[default]
    Modern,
    Classic,
    Minimal,
    Bold,
}

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "layout_alignment", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LayoutAlignment {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "layout_font", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LayoutFont {
    #[default]
    Sans,
    Serif,
    Mono,
}

#[derive(Debug, Clone, Copy, FromRow, Serialize, Deserialize, PartialEq, Eq, TS, Default)]
pub struct CardLayout {
    #[sqlx(rename = "layout_style")]
    pub style: LayoutStyle,
    #[sqlx(rename = "layout_alignment")]
    pub alignment: LayoutAlignment,
    #[sqlx(rename = "layout_font")]
    pub font: LayoutFont,
}

/// The user-editable part of a card. The editor's draft is one of these.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, TS, Default)]
#[serde(default)]
pub struct CardContent {
    pub title: String, // display name
    pub company: String,
    pub job_title: String,
    pub bio: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub address: String,
    pub avatar_url: Option<String>,
    pub cover_url: Option<String>,
    #[serde(alias = "username")]
    pub slug: Option<String>,
    pub theme: CardTheme,
    pub shape: CardShape,
    #[sqlx(flatten)]
    pub layout: CardLayout,
    pub is_published: bool,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Card {
    pub id: Uuid,
    pub user_id: Uuid, // owner
    #[sqlx(flatten)]
    #[serde(flatten)]
    #[ts(flatten)]
    pub content: CardContent,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::ops::Deref for Card {
    type Target = CardContent;
    fn deref(&self) -> &Self::Target {
        &self.content
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateCard {
    pub user_id: Uuid,
    #[serde(flatten)]
    #[ts(flatten)]
    pub content: CardContent,
}

/// Keep only `[a-z0-9_-]`, lowering ASCII capitals first. Never fails.
pub fn sanitize_slug(raw: &str) -> String {
    raw.chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '_')
        .collect()
}

const CARD_COLUMNS: &str = "id, user_id, title, company, job_title, bio, email, phone, website, address, avatar_url, cover_url, slug, theme, shape, layout_style, layout_alignment, layout_font, is_published, view_count, created_at, updated_at";

impl Card {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = $1");
        sqlx::query_as::<_, Card>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE slug = $1");
        sqlx::query_as::<_, Card>(&sql)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// All cards owned by `user_id`, most recently updated first
    pub async fn find_by_user_id(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {CARD_COLUMNS} FROM cards WHERE user_id = $1 ORDER BY updated_at DESC, created_at DESC"
        );
        sqlx::query_as::<_, Card>(&sql)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Insert a card under the caller-chosen `id`.
    ///
    /// The id doubles as an idempotency key: if a row with this id already
    /// exists (a retry after a lost response) it is returned unchanged.
    pub async fn create(pool: &SqlitePool, id: Uuid, data: &CreateCard) -> Result<Self, sqlx::Error> {
        if let Some(existing) = Self::find_by_id(pool, id).await? {
            return Ok(existing);
        }

        let now = Utc::now();
        let c = &data.content;
        sqlx::query(
            r#"INSERT INTO cards (id, user_id, title, company, job_title, bio, email, phone, website, address, avatar_url, cover_url, slug, theme, shape, layout_style, layout_alignment, layout_font, is_published, view_count, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, 0, $20, $21)"#,
        )
        .bind(id)
        .bind(data.user_id)
        .bind(&c.title)
        .bind(&c.company)
        .bind(&c.job_title)
        .bind(&c.bio)
        .bind(&c.email)
        .bind(&c.phone)
        .bind(&c.website)
        .bind(&c.address)
        .bind(&c.avatar_url)
        .bind(&c.cover_url)
        .bind(&c.slug)
        .bind(c.theme)
        .bind(c.shape)
        .bind(c.layout.style)
        .bind(c.layout.alignment)
        .bind(c.layout.font)
        .bind(c.is_published)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Overwrite every editable column. Last write wins.
    pub async fn update(pool: &SqlitePool, id: Uuid, c: &CardContent) -> Result<Self, sqlx::Error> {
        let sql = format!(
            r#"UPDATE cards
               SET title = $1, company = $2, job_title = $3, bio = $4, email = $5, phone = $6, website = $7, address = $8, avatar_url = $9, cover_url = $10, slug = $11, theme = $12, shape = $13, layout_style = $14, layout_alignment = $15, layout_font = $16, is_published = $17, updated_at = $18
               WHERE id = $19
               RETURNING {CARD_COLUMNS}"#
        );
        sqlx::query_as::<_, Card>(&sql)
            .bind(&c.title)
            .bind(&c.company)
            .bind(&c.job_title)
            .bind(&c.bio)
            .bind(&c.email)
            .bind(&c.phone)
            .bind(&c.website)
            .bind(&c.address)
            .bind(&c.avatar_url)
            .bind(&c.cover_url)
            .bind(&c.slug)
            .bind(c.theme)
            .bind(c.shape)
            .bind(c.layout.style)
            .bind(c.layout.alignment)
            .bind(c.layout.font)
            .bind(c.is_published)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn increment_view_count(pool: &SqlitePool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE cards SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    fn content(title: &str, slug: Option<&str>) -> CardContent {
        CardContent {
            title: title.to_string(),
            slug: slug.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_sanitize_slug_drops_foreign_characters() {
        assert_eq!(sanitize_slug("Jane Doe!"), "janedoe");
        assert_eq!(sanitize_slug("jane_doe-42"), "jane_doe-42");
        assert_eq!(sanitize_slug("héllo/wörld"), "hllowrld");
        assert_eq!(sanitize_slug("  "), "");
    }

    #[test]
    fn test_content_accepts_username_alias() {
        let parsed: CardContent =
            serde_json::from_str(r#"{"title": "Bob", "username": "bob"}"#).unwrap();
        assert_eq!(parsed.slug.as_deref(), Some("bob"));
        assert_eq!(parsed.theme, CardTheme::Classic);
    }

    #[tokio::test]
    async fn test_create_is_idempotent_per_id() {
        let db = DBService::new_in_memory().await.unwrap();
        let user_id = Uuid::new_v4();
        let id = Uuid::new_v4();
        let data = CreateCard {
            user_id,
            content: content("Jane Doe", Some("janedoe")),
        };

        let first = Card::create(&db.pool, id, &data).await.unwrap();
        let second = Card::create(&db.pool, id, &data).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(Card::find_by_user_id(&db.pool, user_id).await.unwrap().len(), 1);
        assert!(!first.is_published);
        assert_eq!(first.view_count, 0);
    }

    #[tokio::test]
    async fn test_update_overwrites_layout_and_theme() {
        let db = DBService::new_in_memory().await.unwrap();
        let id = Uuid::new_v4();
        let data = CreateCard {
            user_id: Uuid::new_v4(),
            content: content("Jane", None),
        };
        Card::create(&db.pool, id, &data).await.unwrap();

        let mut edited = data.content.clone();
        edited.theme = CardTheme::Midnight;
        edited.shape = CardShape::Hexagon;
        edited.layout.font = LayoutFont::Mono;
        let updated = Card::update(&db.pool, id, &edited).await.unwrap();

        assert_eq!(updated.theme, CardTheme::Midnight);
        assert_eq!(updated.shape, CardShape::Hexagon);
        assert_eq!(updated.layout.font, LayoutFont::Mono);
        assert_eq!(updated.layout.alignment, LayoutAlignment::Center);
    }

    #[tokio::test]
    async fn test_update_missing_card_is_row_not_found() {
        let db = DBService::new_in_memory().await.unwrap();
        let err = Card::update(&db.pool, Uuid::new_v4(), &CardContent::default())
            .await
            .unwrap_err();
        assert!(matches!(err, sqlx::Error::RowNotFound));
    }

    #[tokio::test]
    async fn test_view_count_and_delete() {
        let db = DBService::new_in_memory().await.unwrap();
        let id = Uuid::new_v4();
        let data = CreateCard {
            user_id: Uuid::new_v4(),
            content: content("Jane", Some("jane")),
        };
        Card::create(&db.pool, id, &data).await.unwrap();

        Card::increment_view_count(&db.pool, id).await.unwrap();
        Card::increment_view_count(&db.pool, id).await.unwrap();
        let card = Card::find_by_slug(&db.pool, "jane").await.unwrap().unwrap();
        assert_eq!(card.view_count, 2);

        assert_eq!(Card::delete(&db.pool, id).await.unwrap(), 1);
        assert!(Card::find_by_id(&db.pool, id).await.unwrap().is_none());
    }
}
