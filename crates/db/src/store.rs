//! The record store seam consumed by the editor and the admin shell.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    DBService,
    models::{
        card::{Card, CardContent, CreateCard},
        media_item::{CreateMediaItem, MediaItem},
        review::{CreateReview, Review},
        social_link::{CreateSocialLink, SocialLink},
    },
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(sqlx::Error),
    #[error("record not found")]
    NotFound,
    #[error("slug already taken: {0}")]
    SlugTaken(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            e => StoreError::Database(e),
        }
    }
}

/// Unique violations on a card write can only come from the slug column;
/// the primary key is guarded by the idempotent insert.
fn map_card_write_error(e: sqlx::Error, slug: Option<&str>) -> StoreError {
    let unique_violation = e
        .as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation());
    match (unique_violation, slug) {
        (true, Some(slug)) => StoreError::SlugTaken(slug.to_string()),
        _ => StoreError::from(e),
    }
}

/// Remote table accessor for cards and their child collections.
///
/// Every call is independently failable; callers get no transactional
/// grouping across calls.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_cards(&self, user_id: Uuid) -> Result<Vec<Card>, StoreError>;

    async fn find_card(&self, id: Uuid) -> Result<Option<Card>, StoreError>;

    async fn find_card_by_slug(&self, slug: &str) -> Result<Option<Card>, StoreError>;

    /// Insert under a client-chosen id. Repeating the call with the same id
    /// returns the existing record instead of creating a second one.
    async fn insert_card(&self, id: Uuid, data: &CreateCard) -> Result<Card, StoreError>;

    async fn update_card(&self, id: Uuid, content: &CardContent) -> Result<Card, StoreError>;

    async fn delete_card(&self, id: Uuid) -> Result<(), StoreError>;

    async fn increment_view_count(&self, id: Uuid) -> Result<(), StoreError>;

    async fn list_social_links(&self, card_id: Uuid) -> Result<Vec<SocialLink>, StoreError>;

    async fn insert_social_link(&self, data: &CreateSocialLink) -> Result<SocialLink, StoreError>;

    async fn delete_social_link(&self, id: Uuid) -> Result<(), StoreError>;

    async fn list_media(&self, card_id: Uuid) -> Result<Vec<MediaItem>, StoreError>;

    async fn insert_media(&self, data: &CreateMediaItem) -> Result<MediaItem, StoreError>;

    async fn list_reviews(&self, card_id: Uuid) -> Result<Vec<Review>, StoreError>;

    async fn insert_review(&self, data: &CreateReview) -> Result<Review, StoreError>;
}

/// Default store backed by the local SQLite database
#[derive(Clone)]
pub struct SqliteRecordStore {
    db: DBService,
}

impl SqliteRecordStore {
    pub fn new(db: DBService) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn list_cards(&self, user_id: Uuid) -> Result<Vec<Card>, StoreError> {
        Ok(Card::find_by_user_id(&self.db.pool, user_id).await?)
    }

    async fn find_card(&self, id: Uuid) -> Result<Option<Card>, StoreError> {
        Ok(Card::find_by_id(&self.db.pool, id).await?)
    }

    async fn find_card_by_slug(&self, slug: &str) -> Result<Option<Card>, StoreError> {
        Ok(Card::find_by_slug(&self.db.pool, slug).await?)
    }

    async fn insert_card(&self, id: Uuid, data: &CreateCard) -> Result<Card, StoreError> {
        Card::create(&self.db.pool, id, data)
            .await
            .map_err(|e| map_card_write_error(e, data.content.slug.as_deref()))
    }

    async fn update_card(&self, id: Uuid, content: &CardContent) -> Result<Card, StoreError> {
        Card::update(&self.db.pool, id, content)
            .await
            .map_err(|e| map_card_write_error(e, content.slug.as_deref()))
    }

    async fn delete_card(&self, id: Uuid) -> Result<(), StoreError> {
        match Card::delete(&self.db.pool, id).await? {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<(), StoreError> {
        Ok(Card::increment_view_count(&self.db.pool, id).await?)
    }

    async fn list_social_links(&self, card_id: Uuid) -> Result<Vec<SocialLink>, StoreError> {
        Ok(SocialLink::find_by_card_id(&self.db.pool, card_id).await?)
    }

    async fn insert_social_link(&self, data: &CreateSocialLink) -> Result<SocialLink, StoreError> {
        Ok(SocialLink::create(&self.db.pool, data).await?)
    }

    async fn delete_social_link(&self, id: Uuid) -> Result<(), StoreError> {
        match SocialLink::delete(&self.db.pool, id).await? {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }

    async fn list_media(&self, card_id: Uuid) -> Result<Vec<MediaItem>, StoreError> {
        Ok(MediaItem::find_by_card_id(&self.db.pool, card_id).await?)
    }

    async fn insert_media(&self, data: &CreateMediaItem) -> Result<MediaItem, StoreError> {
        Ok(MediaItem::create(&self.db.pool, data).await?)
    }

    async fn list_reviews(&self, card_id: Uuid) -> Result<Vec<Review>, StoreError> {
        Ok(Review::find_by_card_id(&self.db.pool, card_id).await?)
    }

    async fn insert_review(&self, data: &CreateReview) -> Result<Review, StoreError> {
        Ok(Review::create(&self.db.pool, data).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteRecordStore {
        SqliteRecordStore::new(DBService::new_in_memory().await.unwrap())
    }

    fn create(user_id: Uuid, slug: &str) -> CreateCard {
        CreateCard {
            user_id,
            content: CardContent {
                title: "Jane Doe".to_string(),
                slug: Some(slug.to_string()),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_duplicate_slug_maps_to_slug_taken() {
        let store = store().await;
        let user_id = Uuid::new_v4();
        store
            .insert_card(Uuid::new_v4(), &create(user_id, "janedoe"))
            .await
            .unwrap();

        let err = store
            .insert_card(Uuid::new_v4(), &create(user_id, "janedoe"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::SlugTaken(ref slug) if slug == "janedoe"));
    }

    #[tokio::test]
    async fn test_update_to_taken_slug_maps_to_slug_taken() {
        let store = store().await;
        let user_id = Uuid::new_v4();
        store
            .insert_card(Uuid::new_v4(), &create(user_id, "jane"))
            .await
            .unwrap();
        let other = store
            .insert_card(Uuid::new_v4(), &create(user_id, "other"))
            .await
            .unwrap();

        let mut content = other.content.clone();
        content.slug = Some("jane".to_string());
        let err = store.update_card(other.id, &content).await.unwrap_err();
        assert!(matches!(err, StoreError::SlugTaken(_)));
    }

    #[tokio::test]
    async fn test_delete_unknown_card_is_not_found() {
        let store = store().await;
        let err = store.delete_card(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_media_and_reviews_round_trip() {
        let store = store().await;
        let card = store
            .insert_card(Uuid::new_v4(), &create(Uuid::new_v4(), "jane"))
            .await
            .unwrap();

        store
            .insert_media(&CreateMediaItem {
                card_id: card.id,
                kind: crate::models::media_item::MediaKind::Image,
                url: "https://cdn.example.com/a.png".to_string(),
                caption: None,
                display_order: 0,
            })
            .await
            .unwrap();
        let review = store
            .insert_review(&CreateReview {
                card_id: card.id,
                reviewer_name: "Sam".to_string(),
                rating: 9,
                comment: Some("Great".to_string()),
                is_approved: true,
            })
            .await
            .unwrap();

        assert_eq!(review.rating, 5);
        assert_eq!(store.list_media(card.id).await.unwrap().len(), 1);
        assert_eq!(store.list_reviews(card.id).await.unwrap().len(), 1);
    }
}
