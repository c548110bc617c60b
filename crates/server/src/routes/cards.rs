use axum::{
    Router,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Json as ResponseJson},
    routing::{get, post},
};
use db::models::{card::Card, media_item::MediaItem, review::Review, social_link::SocialLink};
use serde::Serialize;
use services::services::{duplicate::duplicate_card, snapshot::CardSnapshot};
use ts_rs::TS;
use uuid::Uuid;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

/// A card with its child collections
#[derive(Debug, Serialize, TS)]
pub struct CardDetails {
    #[serde(flatten)]
    #[ts(flatten)]
    pub card: Card,
    pub social_links: Vec<SocialLink>,
    pub media: Vec<MediaItem>,
    pub reviews: Vec<Review>,
}

async fn load_card(state: &AppState, card_id: Uuid) -> Result<Card, ApiError> {
    state
        .store
        .find_card(card_id)
        .await?
        .ok_or(ApiError::CardNotFound)
}

/// GET /api/users/{user_id}/cards
pub async fn list_cards(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Card>>>, ApiError> {
    let mut cards = state.store.list_cards(user_id).await?;
    cards.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    Ok(ResponseJson(ApiResponse::success(cards)))
}

/// GET /api/cards/{card_id}
pub async fn get_card(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<CardDetails>>, ApiError> {
    let card = load_card(&state, card_id).await?;
    let (social_links, media, reviews) = tokio::try_join!(
        state.store.list_social_links(card_id),
        state.store.list_media(card_id),
        state.store.list_reviews(card_id),
    )?;

    Ok(ResponseJson(ApiResponse::success(CardDetails {
        card,
        social_links,
        media,
        reviews,
    })))
}

/// DELETE /api/cards/{card_id}
pub async fn delete_card(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    state.store.delete_card(card_id).await?;
    tracing::info!(card_id = %card_id, "Card deleted");
    Ok(ResponseJson(ApiResponse::success(())))
}

/// POST /api/cards/{card_id}/duplicate
pub async fn duplicate(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Card>>, ApiError> {
    let copy = duplicate_card(state.store.as_ref(), card_id).await?;
    Ok(ResponseJson(ApiResponse::success(copy)))
}

/// GET /api/cards/{card_id}/export
/// Download the card as a JSON backup
pub async fn export_card(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let card = load_card(&state, card_id).await?;
    let (social_links, media, reviews) = tokio::try_join!(
        state.store.list_social_links(card_id),
        state.store.list_media(card_id),
        state.store.list_reviews(card_id),
    )?;

    let snapshot = CardSnapshot::from_parts(&card.content, &social_links, &media, &reviews);
    let body = snapshot.to_json()?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        snapshot.suggested_file_name()
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/users/{user_id}/cards", get(list_cards))
        .route("/cards/{card_id}", get(get_card).delete(delete_card))
        .route("/cards/{card_id}/duplicate", post(duplicate))
        .route("/cards/{card_id}/export", get(export_card))
}
