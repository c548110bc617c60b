use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumIter, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug,
    Clone,
    Copy,
    Type,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    TS,
    EnumString,
    EnumIter,
    Display,
)]
#[sqlx(type_name = "social_platform", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SocialPlatform {
    LinkedIn,
    Twitter,
    Instagram,
    Facebook,
    GitHub,
    YouTube,
    TikTok,
    Threads,
    Website,
}

impl SocialPlatform {
    /// Human readable label for buttons and previews
    pub fn label(self) -> &'static str {
        match self {
            SocialPlatform::LinkedIn => "LinkedIn",
            SocialPlatform::Twitter => "X (Twitter)",
            SocialPlatform::Instagram => "Instagram",
            SocialPlatform::Facebook => "Facebook",
            SocialPlatform::GitHub => "GitHub",
            SocialPlatform::YouTube => "YouTube",
            SocialPlatform::TikTok => "TikTok",
            SocialPlatform::Threads => "Threads",
            SocialPlatform::Website => "Website",
        }
    }

    /// Build the public profile URL for `handle`.
    pub fn profile_url(self, handle: &str) -> String {
        let handle = normalize_handle(handle);
        match self {
            SocialPlatform::LinkedIn => format!("https://www.linkedin.com/in/{handle}"),
            SocialPlatform::Twitter => format!("https://x.com/{handle}"),
            SocialPlatform::Instagram => format!("https://www.instagram.com/{handle}"),
            SocialPlatform::Facebook => format!("https://www.facebook.com/{handle}"),
            SocialPlatform::GitHub => format!("https://github.com/{handle}"),
            SocialPlatform::YouTube => format!("https://www.youtube.com/@{handle}"),
            SocialPlatform::TikTok => format!("https://www.tiktok.com/@{handle}"),
            SocialPlatform::Threads => format!("https://www.threads.net/@{handle}"),
            SocialPlatform::Website => {
                if handle.starts_with("http://") || handle.starts_with("https://") {
                    handle.to_string()
                } else {
                    format!("https://{handle}")
                }
            }
        }
    }
}

/// Trim whitespace and a leading `@`
pub fn normalize_handle(handle: &str) -> &str {
    let handle = handle.trim();
    handle.strip_prefix('@').unwrap_or(handle)
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, TS)]
pub struct SocialLink {
    pub id: Uuid,
    pub card_id: Uuid,
    pub platform: SocialPlatform,
    pub username: String,
    pub url: String,
    pub display_order: i32,
    pub is_active: bool,
    pub auto_synced: bool, // generated from a shared handle rather than entered by hand
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateSocialLink {
    pub card_id: Uuid,
    pub platform: SocialPlatform,
    pub username: String,
    pub url: String,
    pub display_order: i32,
    pub is_active: bool,
    pub auto_synced: bool,
}

impl CreateSocialLink {
    /// A link entered individually by the user
    pub fn manual(card_id: Uuid, platform: SocialPlatform, handle: &str, display_order: i32) -> Self {
        Self {
            card_id,
            platform,
            username: normalize_handle(handle).to_string(),
            url: platform.profile_url(handle),
            display_order,
            is_active: true,
            auto_synced: false,
        }
    }

    /// A link generated in bulk from a shared handle
    pub fn auto_synced(
        card_id: Uuid,
        platform: SocialPlatform,
        handle: &str,
        display_order: i32,
    ) -> Self {
        Self {
            auto_synced: true,
            ..Self::manual(card_id, platform, handle, display_order)
        }
    }

    /// Copy an existing link onto another card, keeping order and flags
    pub fn copy_of(link: &SocialLink, card_id: Uuid) -> Self {
        Self {
            card_id,
            platform: link.platform,
            username: link.username.clone(),
            url: link.url.clone(),
            display_order: link.display_order,
            is_active: link.is_active,
            auto_synced: link.auto_synced,
        }
    }
}

const SOCIAL_LINK_COLUMNS: &str =
    "id, card_id, platform, username, url, display_order, is_active, auto_synced, created_at";

impl SocialLink {
    pub async fn find_by_card_id(pool: &SqlitePool, card_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {SOCIAL_LINK_COLUMNS} FROM social_links WHERE card_id = $1 ORDER BY display_order ASC, created_at ASC"
        );
        sqlx::query_as::<_, SocialLink>(&sql)
            .bind(card_id)
            .fetch_all(pool)
            .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateSocialLink) -> Result<Self, sqlx::Error> {
        let sql = format!(
            r#"INSERT INTO social_links (id, card_id, platform, username, url, display_order, is_active, auto_synced, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING {SOCIAL_LINK_COLUMNS}"#
        );
        sqlx::query_as::<_, SocialLink>(&sql)
            .bind(Uuid::new_v4())
            .bind(data.card_id)
            .bind(data.platform)
            .bind(&data.username)
            .bind(&data.url)
            .bind(data.display_order)
            .bind(data.is_active)
            .bind(data.auto_synced)
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM social_links WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DBService,
        models::card::{Card, CardContent, CreateCard},
    };

    #[test]
    fn test_profile_urls() {
        assert_eq!(
            SocialPlatform::GitHub.profile_url("@janedoe"),
            "https://github.com/janedoe"
        );
        assert_eq!(
            SocialPlatform::TikTok.profile_url(" janedoe "),
            "https://www.tiktok.com/@janedoe"
        );
        assert_eq!(
            SocialPlatform::Website.profile_url("jane.dev"),
            "https://jane.dev"
        );
        assert_eq!(
            SocialPlatform::Website.profile_url("http://jane.dev"),
            "http://jane.dev"
        );
    }

    #[test]
    fn test_platform_parses_lowercase_name() {
        assert_eq!("linkedin".parse::<SocialPlatform>().unwrap(), SocialPlatform::LinkedIn);
        assert_eq!(SocialPlatform::YouTube.to_string(), "youtube");
    }

    #[tokio::test]
    async fn test_links_follow_display_order_and_cascade_on_card_delete() {
        let db = DBService::new_in_memory().await.unwrap();
        let card_id = Uuid::new_v4();
        Card::create(
            &db.pool,
            card_id,
            &CreateCard {
                user_id: Uuid::new_v4(),
                content: CardContent::default(),
            },
        )
        .await
        .unwrap();

        SocialLink::create(
            &db.pool,
            &CreateSocialLink::manual(card_id, SocialPlatform::GitHub, "jane", 1),
        )
        .await
        .unwrap();
        SocialLink::create(
            &db.pool,
            &CreateSocialLink::auto_synced(card_id, SocialPlatform::Twitter, "jane", 0),
        )
        .await
        .unwrap();

        let links = SocialLink::find_by_card_id(&db.pool, card_id).await.unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].platform, SocialPlatform::Twitter);
        assert!(links[0].auto_synced);
        assert!(!links[1].auto_synced);

        Card::delete(&db.pool, card_id).await.unwrap();
        assert!(SocialLink::find_by_card_id(&db.pool, card_id).await.unwrap().is_empty());
    }
}
