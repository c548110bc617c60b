use axum::{
    Router,
    extract::{Path, State},
    response::Html,
    routing::get,
};
use services::services::preview::{CardPreview, escape_html};

use crate::{AppState, error::ApiError};

/// GET /c/{slug}
/// Public card page. Unpublished cards are indistinguishable from missing ones.
pub async fn view_card(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>, ApiError> {
    let card = state
        .store
        .find_card_by_slug(&slug)
        .await?
        .filter(|card| card.is_published)
        .ok_or(ApiError::CardNotFound)?;

    if let Err(e) = state.store.increment_view_count(card.id).await {
        tracing::warn!(card_id = %card.id, error = %e, "Failed to record card view");
    }

    let (social_links, media, reviews) = tokio::try_join!(
        state.store.list_social_links(card.id),
        state.store.list_media(card.id),
        state.store.list_reviews(card.id),
    )?;
    let preview = CardPreview::project(&card.content, &social_links, &media, &reviews);

    Ok(Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{}</title></head><body>{}</body></html>",
        escape_html(&preview.display_name),
        preview.render_html()
    )))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new().route("/c/{slug}", get(view_card))
}
