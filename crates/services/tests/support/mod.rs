#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use db::{
    models::{
        card::{Card, CardContent, CreateCard},
        media_item::{CreateMediaItem, MediaItem},
        review::{CreateReview, Review},
        social_link::{CreateSocialLink, SocialLink},
    },
    store::{RecordStore, StoreError},
};
use services::services::{
    card_editor::EditorContext,
    config::EditorConfig,
    session::UserIdentity,
    ui_host::{UiHost, UiHostError},
};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    InsertCard(Uuid),
    UpdateCard(Uuid),
    DeleteCard(Uuid),
    InsertSocialLink(Uuid),
    DeleteSocialLink(Uuid),
    InsertMedia(Uuid),
    InsertReview(Uuid),
}

/// What happens to the next write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Rejected before anything is written
    Reject,
    /// Written, but the caller sees an error
    LoseResponse,
}

#[derive(Default)]
struct State {
    cards: HashMap<Uuid, Card>,
    links: Vec<SocialLink>,
    media: Vec<MediaItem>,
    reviews: Vec<Review>,
    calls: Vec<Call>,
    fail_next: Option<Failure>,
    clock: i64,
}

impl State {
    fn now(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        Utc.timestamp_opt(1_700_000_000 + self.clock, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    fn slug_taken(&self, id: Uuid, content: &CardContent) -> Option<String> {
        let slug = content.slug.as_ref()?;
        self.cards
            .values()
            .any(|c| c.id != id && c.slug.as_ref() == Some(slug))
            .then(|| slug.clone())
    }

    /// Record the call and decide whether it should fail.
    fn begin(&mut self, call: Call) -> Result<Option<Failure>, StoreError> {
        self.calls.push(call);
        match self.fail_next.take() {
            Some(Failure::Reject) => Err(StoreError::Unavailable("rejected".to_string())),
            other => Ok(other),
        }
    }
}

fn finish<T>(failure: Option<Failure>, value: T) -> Result<T, StoreError> {
    match failure {
        Some(Failure::LoseResponse) => Err(StoreError::Unavailable("connection reset".to_string())),
        _ => Ok(value),
    }
}

/// In-memory store that records every write and can inject failures.
#[derive(Default)]
pub struct RecordingStore {
    state: Mutex<State>,
    update_delay: Mutex<Option<Duration>>,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn fail_next(&self, failure: Failure) {
        self.state.lock().unwrap().fail_next = Some(failure);
    }

    pub fn set_update_delay(&self, delay: Duration) {
        *self.update_delay.lock().unwrap() = Some(delay);
    }

    pub fn card_count(&self) -> usize {
        self.state.lock().unwrap().cards.len()
    }

    pub fn stored_card(&self, id: Uuid) -> Option<Card> {
        self.state.lock().unwrap().cards.get(&id).cloned()
    }

    pub fn stored_links(&self, card_id: Uuid) -> Vec<SocialLink> {
        let mut links: Vec<_> = self
            .state
            .lock()
            .unwrap()
            .links
            .iter()
            .filter(|l| l.card_id == card_id)
            .cloned()
            .collect();
        links.sort_by_key(|l| l.display_order);
        links
    }

    /// Put a card in place without recording a call.
    pub fn seed_card(&self, id: Uuid, user_id: Uuid, content: CardContent) -> Card {
        let mut state = self.state.lock().unwrap();
        let now = state.now();
        let card = Card {
            id,
            user_id,
            content,
            view_count: 7,
            created_at: now,
            updated_at: now,
        };
        state.cards.insert(id, card.clone());
        card
    }
}

#[async_trait]
impl RecordStore for RecordingStore {
    async fn list_cards(&self, user_id: Uuid) -> Result<Vec<Card>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .cards
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_card(&self, id: Uuid) -> Result<Option<Card>, StoreError> {
        Ok(self.state.lock().unwrap().cards.get(&id).cloned())
    }

    async fn find_card_by_slug(&self, slug: &str) -> Result<Option<Card>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .cards
            .values()
            .find(|c| c.slug.as_deref() == Some(slug))
            .cloned())
    }

    async fn insert_card(&self, id: Uuid, data: &CreateCard) -> Result<Card, StoreError> {
        let mut state = self.state.lock().unwrap();
        let failure = state.begin(Call::InsertCard(id))?;
        if let Some(existing) = state.cards.get(&id) {
            return finish(failure, existing.clone());
        }
        if let Some(slug) = state.slug_taken(id, &data.content) {
            return Err(StoreError::SlugTaken(slug));
        }
        let now = state.now();
        let card = Card {
            id,
            user_id: data.user_id,
            content: data.content.clone(),
            view_count: 0,
            created_at: now,
            updated_at: now,
        };
        state.cards.insert(id, card.clone());
        finish(failure, card)
    }

    async fn update_card(&self, id: Uuid, content: &CardContent) -> Result<Card, StoreError> {
        let delay = *self.update_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        let failure = state.begin(Call::UpdateCard(id))?;
        if let Some(slug) = state.slug_taken(id, content) {
            return Err(StoreError::SlugTaken(slug));
        }
        let now = state.now();
        let card = state.cards.get_mut(&id).ok_or(StoreError::NotFound)?;
        card.content = content.clone();
        card.updated_at = now;
        let card = card.clone();
        finish(failure, card)
    }

    async fn delete_card(&self, id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        let failure = state.begin(Call::DeleteCard(id))?;
        state.cards.remove(&id).ok_or(StoreError::NotFound)?;
        state.links.retain(|l| l.card_id != id);
        state.media.retain(|m| m.card_id != id);
        state.reviews.retain(|r| r.card_id != id);
        finish(failure, ())
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(card) = state.cards.get_mut(&id) {
            card.view_count += 1;
        }
        Ok(())
    }

    async fn list_social_links(&self, card_id: Uuid) -> Result<Vec<SocialLink>, StoreError> {
        Ok(self.stored_links(card_id))
    }

    async fn insert_social_link(&self, data: &CreateSocialLink) -> Result<SocialLink, StoreError> {
        let mut state = self.state.lock().unwrap();
        let failure = state.begin(Call::InsertSocialLink(data.card_id))?;
        let link = SocialLink {
            id: Uuid::new_v4(),
            card_id: data.card_id,
            platform: data.platform,
            username: data.username.clone(),
            url: data.url.clone(),
            display_order: data.display_order,
            is_active: data.is_active,
            auto_synced: data.auto_synced,
            created_at: state.now(),
        };
        state.links.push(link.clone());
        finish(failure, link)
    }

    async fn delete_social_link(&self, id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        let failure = state.begin(Call::DeleteSocialLink(id))?;
        let before = state.links.len();
        state.links.retain(|l| l.id != id);
        if state.links.len() == before {
            return Err(StoreError::NotFound);
        }
        finish(failure, ())
    }

    async fn list_media(&self, card_id: Uuid) -> Result<Vec<MediaItem>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .media
            .iter()
            .filter(|m| m.card_id == card_id)
            .cloned()
            .collect())
    }

    async fn insert_media(&self, data: &CreateMediaItem) -> Result<MediaItem, StoreError> {
        let mut state = self.state.lock().unwrap();
        let failure = state.begin(Call::InsertMedia(data.card_id))?;
        let item = MediaItem {
            id: Uuid::new_v4(),
            card_id: data.card_id,
            kind: data.kind,
            url: data.url.clone(),
            caption: data.caption.clone(),
            display_order: data.display_order,
            created_at: state.now(),
        };
        state.media.push(item.clone());
        finish(failure, item)
    }

    async fn list_reviews(&self, card_id: Uuid) -> Result<Vec<Review>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .reviews
            .iter()
            .filter(|r| r.card_id == card_id)
            .cloned()
            .collect())
    }

    async fn insert_review(&self, data: &CreateReview) -> Result<Review, StoreError> {
        let mut state = self.state.lock().unwrap();
        let failure = state.begin(Call::InsertReview(data.card_id))?;
        let review = Review {
            id: Uuid::new_v4(),
            card_id: data.card_id,
            reviewer_name: data.reviewer_name.clone(),
            rating: data.rating.clamp(1, 5),
            comment: data.comment.clone(),
            is_approved: data.is_approved,
            created_at: state.now(),
        };
        state.reviews.push(review.clone());
        finish(failure, review)
    }
}

/// UI host that records what the user would have seen.
pub struct RecordingUi {
    pub alerts: Mutex<Vec<String>>,
    pub clipboard: Mutex<Vec<String>>,
    pub opened: Mutex<Vec<String>>,
    confirm_answer: bool,
}

impl RecordingUi {
    pub fn new(confirm_answer: bool) -> Arc<Self> {
        Arc::new(Self {
            alerts: Mutex::new(Vec::new()),
            clipboard: Mutex::new(Vec::new()),
            opened: Mutex::new(Vec::new()),
            confirm_answer,
        })
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }
}

#[async_trait]
impl UiHost for RecordingUi {
    async fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }

    async fn confirm(&self, _message: &str) -> bool {
        self.confirm_answer
    }

    async fn copy_to_clipboard(&self, text: &str) -> Result<(), UiHostError> {
        self.clipboard.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn open_url(&self, url: &str) {
        self.opened.lock().unwrap().push(url.to_string());
    }
}

pub fn owner() -> UserIdentity {
    UserIdentity {
        id: Uuid::from_u128(7),
        email: Some("jane@example.com".to_string()),
    }
}

pub fn context(store: &Arc<RecordingStore>, ui: &Arc<RecordingUi>) -> EditorContext {
    EditorContext {
        store: store.clone(),
        ui: ui.clone(),
        owner: owner(),
        config: EditorConfig::default(),
    }
}
