pub mod card;
pub mod media_item;
pub mod review;
pub mod social_link;
