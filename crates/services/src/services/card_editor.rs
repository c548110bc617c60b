//! Card editor state machine: one draft, its child collections, and the
//! rules for when the draft is persisted.

use std::sync::{Arc, Weak};

use db::{
    models::{
        card::{Card, CardContent, CreateCard},
        media_item::MediaItem,
        review::Review,
        social_link::{CreateSocialLink, SocialLink, SocialPlatform, normalize_handle},
    },
    store::{RecordStore, StoreError},
};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{
    card_field::{CardField, FieldError},
    config::EditorConfig,
    debounce::Debouncer,
    duplicate::duplicate_card,
    preview::CardPreview,
    session::UserIdentity,
    snapshot::{CardSnapshot, StagedChildren},
    ui_host::UiHost,
};

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("card has not been saved yet")]
    NotPersisted,
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl EditorError {
    /// Message shown in the blocking alert for a failed `action`
    pub fn user_message(&self, action: &str) -> String {
        match self {
            EditorError::Store(StoreError::SlugTaken(slug)) => format!(
                "The URL \"{slug}\" is already taken. Choose another one and try again."
            ),
            EditorError::NotPersisted => format!("Save the card before you {action}."),
            EditorError::Snapshot(_) => {
                "This file is not a valid card backup. Please choose another file.".to_string()
            }
            _ => format!("Failed to {action}. Please try again."),
        }
    }
}

/// Persistence state of the draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EditorState {
    /// No persisted identity yet
    New,
    /// Draft matches the last persisted write
    Persisted,
    /// Local edits since the last persisted write
    Dirty,
}

/// Editor tabs, in navigation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter, Default)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EditorStep {
    #[default]
    Basics,
    Contact,
    Design,
    Social,
    Media,
    Reviews,
}

impl EditorStep {
    pub fn next(self) -> Option<Self> {
        Self::iter().skip_while(|s| *s != self).nth(1)
    }

    pub fn previous(self) -> Option<Self> {
        Self::iter().take_while(|s| *s != self).last()
    }
}

/// Everything an editor needs from its host, passed in explicitly.
#[derive(Clone)]
pub struct EditorContext {
    pub store: Arc<dyn RecordStore>,
    pub ui: Arc<dyn UiHost>,
    pub owner: UserIdentity,
    pub config: EditorConfig,
}

struct EditorCore {
    card_id: Option<Uuid>,
    /// Id offered on insert until one succeeds, so a retried insert after a
    /// lost response lands on the same record.
    insert_key: Uuid,
    state: EditorState,
    step: EditorStep,
    draft: CardContent,
    persisted: Option<Card>,
    social_links: Vec<SocialLink>,
    media: Vec<MediaItem>,
    reviews: Vec<Review>,
    staged: Option<StagedChildren>,
}

impl EditorCore {
    fn mark_edited(&mut self) {
        if self.state == EditorState::Persisted {
            self.state = EditorState::Dirty;
        }
    }
}

struct EditorInner {
    ctx: EditorContext,
    core: Mutex<EditorCore>,
    /// Held for the whole of a persist. Manual saves wait on it, auto-save
    /// only try-locks it.
    save_lock: Mutex<()>,
    auto_save: Debouncer,
}

impl EditorInner {
    /// Insert or update the draft. Caller holds `save_lock`.
    async fn persist(&self) -> Result<Card, EditorError> {
        let (card_id, insert_key, draft) = {
            let core = self.core.lock().await;
            (core.card_id, core.insert_key, core.draft.clone())
        };

        let card = match card_id {
            Some(id) => self.ctx.store.update_card(id, &draft).await?,
            None => {
                let data = CreateCard {
                    user_id: self.ctx.owner.id,
                    content: draft.clone(),
                };
                let card = self.ctx.store.insert_card(insert_key, &data).await?;
                info!(card_id = %card.id, "Card created");
                // A retried insert returns the row as first written; edits
                // made since then still need to land.
                if card.content != draft {
                    self.ctx.store.update_card(card.id, &draft).await?
                } else {
                    card
                }
            }
        };

        let staged = {
            let mut core = self.core.lock().await;
            core.card_id = Some(card.id);
            core.state = if core.draft == draft {
                EditorState::Persisted
            } else {
                EditorState::Dirty
            };
            core.persisted = Some(card.clone());
            core.staged.take()
        };

        if let Some(staged) = staged {
            self.persist_staged(card.id, staged).await;
        }

        Ok(card)
    }

    /// Write imported children one by one. Failures are logged and skipped.
    async fn persist_staged(&self, card_id: Uuid, staged: StagedChildren) {
        for link in staged.social_links {
            let order = self.core.lock().await.social_links.len() as i32;
            let data = CreateSocialLink {
                display_order: order,
                ..link.into_create(card_id)
            };
            match self.ctx.store.insert_social_link(&data).await {
                Ok(link) => self.core.lock().await.social_links.push(link),
                Err(e) => warn!(card_id = %card_id, error = %e, "Failed to import social link"),
            }
        }

        for item in staged.media {
            let mut data = item.into_create(card_id);
            data.display_order = self.core.lock().await.media.len() as i32;
            match self.ctx.store.insert_media(&data).await {
                Ok(item) => self.core.lock().await.media.push(item),
                Err(e) => warn!(card_id = %card_id, error = %e, "Failed to import media item"),
            }
        }

        for review in staged.reviews {
            match self.ctx.store.insert_review(&review.into_create(card_id)).await {
                Ok(review) => self.core.lock().await.reviews.push(review),
                Err(e) => warn!(card_id = %card_id, error = %e, "Failed to import review"),
            }
        }
    }

    async fn auto_save(&self) {
        let Ok(_guard) = self.save_lock.try_lock() else {
            debug!("Manual save in flight, deferring auto-save");
            self.auto_save.touch();
            return;
        };

        let (card_id, state) = {
            let core = self.core.lock().await;
            (core.card_id, core.state)
        };
        let Some(card_id) = card_id else {
            debug!("Card has no identity yet, auto-save waits for the first save");
            return;
        };
        if state != EditorState::Dirty {
            return;
        }

        match self.persist().await {
            Ok(_) => debug!(card_id = %card_id, "Auto-saved card"),
            Err(e) => warn!(card_id = %card_id, error = %e, "Auto-save failed"),
        }
    }

    /// Log and alert. Returns the error for propagation.
    async fn report(&self, action: &str, err: EditorError) -> EditorError {
        error!(action = %action, error = %err, "Card editor operation failed");
        self.ctx.ui.alert(&err.user_message(action)).await;
        err
    }

    async fn require_identity(&self, action: &str) -> Result<Uuid, EditorError> {
        let card_id = self.core.lock().await.card_id;
        match card_id {
            Some(id) => Ok(id),
            None => Err(self.report(action, EditorError::NotPersisted).await),
        }
    }
}

/// Editor for one card. Cheap to share behind the host's own handle; the
/// auto-save task stops once the editor is dropped.
pub struct CardEditor {
    inner: Arc<EditorInner>,
}

impl CardEditor {
    /// Seed a draft from `existing`, or start a blank one. Must be called
    /// inside a Tokio runtime.
    pub fn new(ctx: EditorContext, existing: Option<Card>) -> Self {
        let core = match existing {
            Some(card) => EditorCore {
                card_id: Some(card.id),
                insert_key: card.id,
                state: EditorState::Persisted,
                step: EditorStep::default(),
                draft: card.content.clone(),
                persisted: Some(card),
                social_links: Vec::new(),
                media: Vec::new(),
                reviews: Vec::new(),
                staged: None,
            },
            None => EditorCore {
                card_id: None,
                insert_key: Uuid::new_v4(),
                state: EditorState::New,
                step: EditorStep::default(),
                draft: CardContent::default(),
                persisted: None,
                social_links: Vec::new(),
                media: Vec::new(),
                reviews: Vec::new(),
                staged: None,
            },
        };

        let delay = ctx.config.auto_save_delay;
        let inner = Arc::new_cyclic(|weak: &Weak<EditorInner>| {
            let weak = weak.clone();
            EditorInner {
                ctx,
                core: Mutex::new(core),
                save_lock: Mutex::new(()),
                auto_save: Debouncer::spawn(delay, move || {
                    let weak = weak.clone();
                    async move {
                        if let Some(inner) = weak.upgrade() {
                            inner.auto_save().await;
                        }
                    }
                }),
            }
        });

        Self { inner }
    }

    /// Load a persisted card with its social links, media and reviews.
    pub async fn open(ctx: EditorContext, card_id: Uuid) -> Result<Self, EditorError> {
        let store = ctx.store.clone();
        let card = store
            .find_card(card_id)
            .await?
            .ok_or(StoreError::NotFound)?;
        let (social_links, media, reviews) = tokio::try_join!(
            store.list_social_links(card_id),
            store.list_media(card_id),
            store.list_reviews(card_id),
        )?;

        let editor = Self::new(ctx, Some(card));
        {
            let mut core = editor.inner.core.lock().await;
            core.social_links = social_links;
            core.social_links.sort_by_key(|l| l.display_order);
            core.media = media;
            core.reviews = reviews;
        }
        debug!(card_id = %card_id, "Opened card editor");
        Ok(editor)
    }

    pub async fn state(&self) -> EditorState {
        self.inner.core.lock().await.state
    }

    pub async fn card_id(&self) -> Option<Uuid> {
        self.inner.core.lock().await.card_id
    }

    pub async fn step(&self) -> EditorStep {
        self.inner.core.lock().await.step
    }

    pub async fn draft(&self) -> CardContent {
        self.inner.core.lock().await.draft.clone()
    }

    /// Last record returned by the store
    pub async fn persisted(&self) -> Option<Card> {
        self.inner.core.lock().await.persisted.clone()
    }

    pub async fn social_links(&self) -> Vec<SocialLink> {
        self.inner.core.lock().await.social_links.clone()
    }

    pub async fn media(&self) -> Vec<MediaItem> {
        self.inner.core.lock().await.media.clone()
    }

    pub async fn reviews(&self) -> Vec<Review> {
        self.inner.core.lock().await.reviews.clone()
    }

    pub async fn public_url(&self) -> Option<String> {
        let core = self.inner.core.lock().await;
        core.draft
            .slug
            .as_deref()
            .map(|slug| self.inner.ctx.config.public_url(slug))
    }

    pub async fn preview(&self) -> CardPreview {
        let core = self.inner.core.lock().await;
        CardPreview::project(&core.draft, &core.social_links, &core.media, &core.reviews)
    }

    /// Local mutation only; restarts the auto-save quiet period.
    pub async fn set_field(&self, field: CardField) {
        {
            let mut core = self.inner.core.lock().await;
            field.apply(&mut core.draft);
            core.mark_edited();
        }
        self.inner.auto_save.touch();
    }

    pub async fn set_field_by_name(&self, name: &str, value: &str) -> Result<(), EditorError> {
        let field = CardField::parse(name, value)?;
        self.set_field(field).await;
        Ok(())
    }

    /// Persist the draft: insert when the card has no identity yet, update
    /// otherwise. On failure the draft is kept for a retry.
    pub async fn save(&self) -> Result<Card, EditorError> {
        let _guard = self.inner.save_lock.lock().await;
        match self.inner.persist().await {
            Ok(card) => {
                debug!(card_id = %card.id, "Card saved");
                Ok(card)
            }
            Err(e) => Err(self.inner.report("save the card", e).await),
        }
    }

    /// Save, then move to `step`. Stays on the current tab if the save fails.
    pub async fn go_to_step(&self, step: EditorStep) -> Result<EditorStep, EditorError> {
        let current = self.step().await;
        if current == step {
            return Ok(step);
        }
        self.save().await?;
        self.inner.core.lock().await.step = step;
        Ok(step)
    }

    pub async fn next_step(&self) -> Result<EditorStep, EditorError> {
        match self.step().await.next() {
            Some(step) => self.go_to_step(step).await,
            None => self.save().await.map(|_| EditorStep::Reviews),
        }
    }

    pub async fn previous_step(&self) -> Result<EditorStep, EditorError> {
        match self.step().await.previous() {
            Some(step) => self.go_to_step(step).await,
            None => Ok(EditorStep::Basics),
        }
    }

    pub async fn toggle_published(&self) -> Result<Card, EditorError> {
        let published = self.inner.core.lock().await.draft.is_published;
        self.set_field(CardField::Published(!published)).await;
        self.save().await
    }

    /// Append a manually entered link at the end of the current order.
    pub async fn add_social_link(
        &self,
        platform: SocialPlatform,
        handle: &str,
    ) -> Result<SocialLink, EditorError> {
        const ACTION: &str = "add the social link";
        let card_id = self.inner.require_identity(ACTION).await?;
        let order = self.inner.core.lock().await.social_links.len() as i32;

        let data = CreateSocialLink::manual(card_id, platform, handle, order);
        match self.inner.ctx.store.insert_social_link(&data).await {
            Ok(link) => {
                self.inner.core.lock().await.social_links.push(link.clone());
                Ok(link)
            }
            Err(e) => Err(self.inner.report(ACTION, e.into()).await),
        }
    }

    /// Remaining links keep their order values; no renumbering.
    pub async fn remove_social_link(&self, link_id: Uuid) -> Result<(), EditorError> {
        const ACTION: &str = "remove the social link";
        self.inner.require_identity(ACTION).await?;

        match self.inner.ctx.store.delete_social_link(link_id).await {
            Ok(()) | Err(StoreError::NotFound) => {
                self.inner
                    .core
                    .lock()
                    .await
                    .social_links
                    .retain(|l| l.id != link_id);
                Ok(())
            }
            Err(e) => Err(self.inner.report(ACTION, e.into()).await),
        }
    }

    /// Replace every auto-synced link with one per `platforms` entry built
    /// from `handle`. Manually entered links are left alone. Each remote call
    /// stands on its own: a failure stops the sync but keeps what was done.
    pub async fn sync_social_links(
        &self,
        handle: &str,
        platforms: &[SocialPlatform],
    ) -> Result<Vec<SocialLink>, EditorError> {
        const ACTION: &str = "sync social links";
        let card_id = self.inner.require_identity(ACTION).await?;

        let stale: Vec<Uuid> = {
            let core = self.inner.core.lock().await;
            core.social_links
                .iter()
                .filter(|l| l.auto_synced)
                .map(|l| l.id)
                .collect()
        };
        for link_id in stale {
            match self.inner.ctx.store.delete_social_link(link_id).await {
                Ok(()) | Err(StoreError::NotFound) => self
                    .inner
                    .core
                    .lock()
                    .await
                    .social_links
                    .retain(|l| l.id != link_id),
                Err(e) => return Err(self.inner.report(ACTION, e.into()).await),
            }
        }

        let handle = normalize_handle(handle);
        let mut created = Vec::new();
        if handle.is_empty() {
            return Ok(created);
        }

        for platform in platforms {
            let order = self.inner.core.lock().await.social_links.len() as i32;
            let data = CreateSocialLink::auto_synced(card_id, *platform, handle, order);
            match self.inner.ctx.store.insert_social_link(&data).await {
                Ok(link) => {
                    self.inner.core.lock().await.social_links.push(link.clone());
                    created.push(link);
                }
                Err(e) => return Err(self.inner.report(ACTION, e.into()).await),
            }
        }

        info!(
            card_id = %card_id,
            count = created.len(),
            "Synced social links"
        );
        Ok(created)
    }

    /// Copy the persisted card into a new unpublished record and return an
    /// editor opened on the copy.
    pub async fn duplicate(&self) -> Result<CardEditor, EditorError> {
        const ACTION: &str = "duplicate the card";
        let card_id = self.inner.require_identity(ACTION).await?;

        let copy = match duplicate_card(self.inner.ctx.store.as_ref(), card_id).await {
            Ok(copy) => copy,
            Err(e) => return Err(self.inner.report(ACTION, e.into()).await),
        };
        match CardEditor::open(self.inner.ctx.clone(), copy.id).await {
            Ok(editor) => Ok(editor),
            Err(e) => Err(self.inner.report(ACTION, e).await),
        }
    }

    /// Draft, child collections and anything staged by an import
    pub async fn export_snapshot(&self) -> CardSnapshot {
        let core = self.inner.core.lock().await;
        let mut snapshot =
            CardSnapshot::from_parts(&core.draft, &core.social_links, &core.media, &core.reviews);
        if let Some(staged) = &core.staged {
            snapshot.social_links.extend(staged.social_links.iter().cloned());
            snapshot.media.extend(staged.media.iter().cloned());
            snapshot.reviews.extend(staged.reviews.iter().cloned());
        }
        snapshot
    }

    /// Replace the draft with a backup. Child records are written after the
    /// next successful save.
    pub async fn import_snapshot(&self, json: &str) -> Result<(), EditorError> {
        let snapshot = match CardSnapshot::from_json(json) {
            Ok(snapshot) => snapshot,
            Err(e) => return Err(self.inner.report("import the backup", e.into()).await),
        };
        let (content, staged) = snapshot.into_import(&self.inner.ctx.config.import_slug_suffix);

        {
            let mut core = self.inner.core.lock().await;
            core.draft = content;
            core.staged = (!staged.is_empty()).then_some(staged);
            core.mark_edited();
        }
        self.inner.auto_save.touch();
        info!("Imported card backup into draft");
        Ok(())
    }
}
