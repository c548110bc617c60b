//! JSON backup format for a card draft and its child collections.

use chrono::{DateTime, Utc};
use db::models::{
    card::{CardContent, sanitize_slug},
    media_item::{CreateMediaItem, MediaItem, MediaKind},
    review::{CreateReview, Review},
    social_link::{CreateSocialLink, SocialLink, SocialPlatform},
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct SnapshotSocialLink {
    pub platform: SocialPlatform,
    pub username: String,
    pub url: String,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub auto_synced: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct SnapshotMediaItem {
    #[serde(default)]
    pub kind: MediaKind,
    pub url: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct SnapshotReview {
    pub reviewer_name: String,
    pub rating: i32,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub is_approved: bool,
}

fn default_true() -> bool {
    true
}

/// Full draft plus child collections, as written to a backup file.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CardSnapshot {
    #[serde(flatten)]
    #[ts(flatten)]
    pub content: CardContent,
    #[serde(default)]
    pub social_links: Vec<SnapshotSocialLink>,
    #[serde(default)]
    pub media: Vec<SnapshotMediaItem>,
    #[serde(default)]
    pub reviews: Vec<SnapshotReview>,
    #[serde(default)]
    pub exported_at: Option<DateTime<Utc>>,
}

/// Child records imported before the card had an identity. They are written
/// once the next save succeeds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagedChildren {
    pub social_links: Vec<SnapshotSocialLink>,
    pub media: Vec<SnapshotMediaItem>,
    pub reviews: Vec<SnapshotReview>,
}

impl StagedChildren {
    pub fn is_empty(&self) -> bool {
        self.social_links.is_empty() && self.media.is_empty() && self.reviews.is_empty()
    }
}

impl SnapshotSocialLink {
    pub fn into_create(self, card_id: Uuid) -> CreateSocialLink {
        CreateSocialLink {
            card_id,
            platform: self.platform,
            username: self.username,
            url: self.url,
            display_order: self.display_order,
            is_active: self.is_active,
            auto_synced: self.auto_synced,
        }
    }
}

impl SnapshotMediaItem {
    pub fn into_create(self, card_id: Uuid) -> CreateMediaItem {
        CreateMediaItem {
            card_id,
            kind: self.kind,
            url: self.url,
            caption: self.caption,
            display_order: self.display_order,
        }
    }
}

impl SnapshotReview {
    pub fn into_create(self, card_id: Uuid) -> CreateReview {
        CreateReview {
            card_id,
            reviewer_name: self.reviewer_name,
            rating: self.rating,
            comment: self.comment,
            is_approved: self.is_approved,
        }
    }
}

impl CardSnapshot {
    pub fn from_parts(
        content: &CardContent,
        social_links: &[SocialLink],
        media: &[MediaItem],
        reviews: &[Review],
    ) -> Self {
        Self {
            content: content.clone(),
            social_links: social_links
                .iter()
                .map(|l| SnapshotSocialLink {
                    platform: l.platform,
                    username: l.username.clone(),
                    url: l.url.clone(),
                    display_order: l.display_order,
                    is_active: l.is_active,
                    auto_synced: l.auto_synced,
                })
                .collect(),
            media: media
                .iter()
                .map(|m| SnapshotMediaItem {
                    kind: m.kind,
                    url: m.url.clone(),
                    caption: m.caption.clone(),
                    display_order: m.display_order,
                })
                .collect(),
            reviews: reviews
                .iter()
                .map(|r| SnapshotReview {
                    reviewer_name: r.reviewer_name.clone(),
                    rating: r.rating,
                    comment: r.comment.clone(),
                    is_approved: r.is_approved,
                })
                .collect(),
            exported_at: Some(Utc::now()),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a backup file. Beyond a successful parse nothing is validated.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn suggested_file_name(&self) -> String {
        let stem = self.content.slug.as_deref().unwrap_or("card");
        let date = self.exported_at.unwrap_or_else(Utc::now).format("%Y-%m-%d");
        format!("{stem}-backup-{date}.json")
    }

    /// Split into the draft to load and the children to stage. The slug gets
    /// `slug_suffix` appended so the import cannot collide with its source.
    pub fn into_import(self, slug_suffix: &str) -> (CardContent, StagedChildren) {
        let mut content = self.content;
        content.slug = content
            .slug
            .map(|slug| sanitize_slug(&format!("{slug}{slug_suffix}")));
        let staged = StagedChildren {
            social_links: self.social_links,
            media: self.media,
            reviews: self.reviews,
        };
        (content, staged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_appends_suffix_to_username() {
        let json = r#"{"title": "Bob", "username": "bob", "social_links": [
            {"platform": "github", "username": "bob", "url": "https://github.com/bob"}
        ]}"#;
        let snapshot = CardSnapshot::from_json(json).unwrap();
        let (content, staged) = snapshot.into_import("-imported");

        assert_eq!(content.title, "Bob");
        assert_eq!(content.slug.as_deref(), Some("bob-imported"));
        assert_eq!(staged.social_links.len(), 1);
        assert!(staged.social_links[0].is_active);
        assert!(staged.media.is_empty());
    }

    #[test]
    fn test_import_without_slug_keeps_none() {
        let (content, staged) = CardSnapshot::from_json(r#"{"title": "Anon"}"#)
            .unwrap()
            .into_import("-imported");
        assert_eq!(content.slug, None);
        assert!(staged.is_empty());
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        assert!(CardSnapshot::from_json("{not json").is_err());
        assert!(CardSnapshot::from_json(r#"{"theme": "plaid"}"#).is_err());
    }

    #[test]
    fn test_export_keeps_everything_needed_to_restore() {
        let content = CardContent {
            title: "Jane".to_string(),
            slug: Some("jane".to_string()),
            ..Default::default()
        };
        let snapshot = CardSnapshot::from_parts(&content, &[], &[], &[]);
        let json = snapshot.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["title"], "Jane");
        assert_eq!(value["slug"], "jane");
        assert_eq!(value["layout"]["alignment"], "center");
        assert!(value["exported_at"].is_string());
        assert!(snapshot.suggested_file_name().starts_with("jane-backup-"));
    }
}
