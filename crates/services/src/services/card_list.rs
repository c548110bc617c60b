//! Admin shell: the signed-in user's cards and the per-card actions.

use std::sync::Arc;

use db::{
    models::card::Card,
    store::{RecordStore, StoreError},
};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{
    card_editor::{CardEditor, EditorContext, EditorError},
    config::EditorConfig,
    duplicate::duplicate_card,
    session::{SessionError, SessionProvider, UserIdentity},
    ui_host::{UiHost, UiHostError},
};

#[derive(Debug, Error)]
pub enum CardListError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Clipboard(#[from] UiHostError),
    #[error("not signed in")]
    NotSignedIn,
    #[error("card has no public URL yet")]
    NoSlug,
}

pub struct CardList {
    store: Arc<dyn RecordStore>,
    session: Arc<dyn SessionProvider>,
    ui: Arc<dyn UiHost>,
    config: EditorConfig,
    cards: RwLock<Vec<Card>>,
}

impl CardList {
    pub fn new(
        store: Arc<dyn RecordStore>,
        session: Arc<dyn SessionProvider>,
        ui: Arc<dyn UiHost>,
        config: EditorConfig,
    ) -> Self {
        Self {
            store,
            session,
            ui,
            config,
            cards: RwLock::new(Vec::new()),
        }
    }

    async fn owner(&self) -> Result<UserIdentity, CardListError> {
        self.session
            .current_user()
            .await
            .ok_or(CardListError::NotSignedIn)
    }

    async fn context(&self) -> Result<EditorContext, CardListError> {
        Ok(EditorContext {
            store: self.store.clone(),
            ui: self.ui.clone(),
            owner: self.owner().await?,
            config: self.config.clone(),
        })
    }

    /// Refresh from the store, most recently updated first.
    pub async fn load(&self) -> Result<Vec<Card>, CardListError> {
        let owner = self.owner().await?;
        let mut cards = match self.store.list_cards(owner.id).await {
            Ok(cards) => cards,
            Err(e) => {
                error!(user_id = %owner.id, error = %e, "Failed to load cards");
                self.ui
                    .alert("Failed to load your cards. Please try again.")
                    .await;
                return Err(e.into());
            }
        };
        cards.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        *self.cards.write().await = cards.clone();
        Ok(cards)
    }

    /// Cards as of the last `load`
    pub async fn cards(&self) -> Vec<Card> {
        self.cards.read().await.clone()
    }

    pub async fn create_editor(&self) -> Result<CardEditor, CardListError> {
        Ok(CardEditor::new(self.context().await?, None))
    }

    pub async fn open_editor(&self, card_id: Uuid) -> Result<CardEditor, CardListError> {
        Ok(CardEditor::open(self.context().await?, card_id).await?)
    }

    /// Ask for confirmation, delete, reload. Returns `false` when the user
    /// declined.
    pub async fn delete(&self, card_id: Uuid) -> Result<bool, CardListError> {
        if !self
            .ui
            .confirm("Are you sure you want to delete this card? This cannot be undone.")
            .await
        {
            return Ok(false);
        }

        if let Err(e) = self.store.delete_card(card_id).await {
            error!(card_id = %card_id, error = %e, "Failed to delete card");
            self.ui
                .alert("Failed to delete the card. Please try again.")
                .await;
            return Err(e.into());
        }
        info!(card_id = %card_id, "Card deleted");

        self.load().await?;
        Ok(true)
    }

    pub async fn duplicate(&self, card_id: Uuid) -> Result<Card, CardListError> {
        let copy = match duplicate_card(self.store.as_ref(), card_id).await {
            Ok(copy) => copy,
            Err(e) => {
                error!(card_id = %card_id, error = %e, "Failed to duplicate card");
                self.ui
                    .alert("Failed to duplicate the card. Please try again.")
                    .await;
                return Err(e.into());
            }
        };
        self.load().await?;
        Ok(copy)
    }

    async fn slug_of(&self, card_id: Uuid) -> Result<String, CardListError> {
        let cached = self
            .cards
            .read()
            .await
            .iter()
            .find(|c| c.id == card_id)
            .map(|c| c.slug.clone());
        let slug = match cached {
            Some(slug) => slug,
            None => self
                .store
                .find_card(card_id)
                .await?
                .ok_or(StoreError::NotFound)?
                .content
                .slug,
        };
        slug.ok_or(CardListError::NoSlug)
    }

    pub async fn public_url(&self, card_id: Uuid) -> Result<String, CardListError> {
        let slug = self.slug_of(card_id).await?;
        Ok(self.config.public_url(&slug))
    }

    pub async fn copy_public_url(&self, card_id: Uuid) -> Result<String, CardListError> {
        let url = self.public_url(card_id).await?;
        if let Err(e) = self.ui.copy_to_clipboard(&url).await {
            warn!(card_id = %card_id, error = %e, "Failed to copy public URL");
            self.ui.alert("Could not copy the link to the clipboard.").await;
            return Err(e.into());
        }
        Ok(url)
    }

    pub async fn open_public_view(&self, card_id: Uuid) -> Result<String, CardListError> {
        let url = self.public_url(card_id).await?;
        self.ui.open_url(&url).await;
        Ok(url)
    }

    pub async fn sign_out(&self) -> Result<(), CardListError> {
        self.session.sign_out().await?;
        self.cards.write().await.clear();
        Ok(())
    }
}
