use db::{
    models::{
        card::{Card, CardContent, CreateCard},
        social_link::CreateSocialLink,
    },
    store::{RecordStore, StoreError},
};
use tracing::{info, warn};
use uuid::Uuid;

/// Copy a persisted card into a new unpublished record.
///
/// Identity, timestamps and slug are dropped and the view counter starts at
/// zero. Social links are copied afterwards one by one; a failed link copy is
/// logged and skipped, the new card is kept either way.
pub async fn duplicate_card(store: &dyn RecordStore, source_id: Uuid) -> Result<Card, StoreError> {
    let source = store
        .find_card(source_id)
        .await?
        .ok_or(StoreError::NotFound)?;

    let content = CardContent {
        slug: None,
        is_published: false,
        ..source.content.clone()
    };
    let copy = store
        .insert_card(
            Uuid::new_v4(),
            &CreateCard {
                user_id: source.user_id,
                content,
            },
        )
        .await?;

    info!(
        source_card_id = %source_id,
        card_id = %copy.id,
        "Duplicated card"
    );

    match store.list_social_links(source_id).await {
        Ok(links) => {
            for link in links {
                if let Err(e) = store
                    .insert_social_link(&CreateSocialLink::copy_of(&link, copy.id))
                    .await
                {
                    warn!(
                        card_id = %copy.id,
                        platform = %link.platform,
                        error = %e,
                        "Failed to copy social link to duplicated card"
                    );
                }
            }
        }
        Err(e) => {
            warn!(
                source_card_id = %source_id,
                error = %e,
                "Failed to load social links for duplication"
            );
        }
    }

    Ok(copy)
}
