//! Typed form bindings for the card draft.

use std::str::FromStr;

use db::models::card::{
    CardContent, CardShape, CardTheme, LayoutAlignment, LayoutFont, LayoutStyle, sanitize_slug,
};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("invalid value {value:?} for field {field}")]
    InvalidValue { field: String, value: String },
}

/// One edit to one draft field
#[derive(Debug, Clone, PartialEq)]
pub enum CardField {
    Title(String),
    Company(String),
    JobTitle(String),
    Bio(String),
    Email(String),
    Phone(String),
    Website(String),
    Address(String),
    AvatarUrl(Option<String>),
    CoverUrl(Option<String>),
    Slug(String),
    Theme(CardTheme),
    Shape(CardShape),
    LayoutStyle(LayoutStyle),
    LayoutAlignment(LayoutAlignment),
    LayoutFont(LayoutFont),
    Published(bool),
}

fn parse_value<T: FromStr>(field: &str, value: &str) -> Result<T, FieldError> {
    value
        .trim()
        .to_ascii_lowercase()
        .parse()
        .map_err(|_| FieldError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        })
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl CardField {
    /// Parse a string-keyed form binding. `username` is accepted for `slug`.
    pub fn parse(name: &str, value: &str) -> Result<Self, FieldError> {
        let field = match name {
            "title" | "name" => CardField::Title(value.to_string()),
            "company" => CardField::Company(value.to_string()),
            "job_title" | "role" => CardField::JobTitle(value.to_string()),
            "bio" => CardField::Bio(value.to_string()),
            "email" => CardField::Email(value.to_string()),
            "phone" => CardField::Phone(value.to_string()),
            "website" => CardField::Website(value.to_string()),
            "address" => CardField::Address(value.to_string()),
            "avatar_url" => CardField::AvatarUrl(optional(value)),
            "cover_url" => CardField::CoverUrl(optional(value)),
            "slug" | "username" => CardField::Slug(value.to_string()),
            "theme" => CardField::Theme(parse_value(name, value)?),
            "shape" => CardField::Shape(parse_value(name, value)?),
            "layout_style" => CardField::LayoutStyle(parse_value(name, value)?),
            "layout_alignment" => CardField::LayoutAlignment(parse_value(name, value)?),
            "layout_font" => CardField::LayoutFont(parse_value(name, value)?),
            "is_published" => CardField::Published(parse_value(name, value)?),
            other => return Err(FieldError::UnknownField(other.to_string())),
        };
        Ok(field)
    }

    /// Apply the edit to `content`. Slugs are filtered, never rejected.
    pub fn apply(self, content: &mut CardContent) {
        match self {
            CardField::Title(v) => content.title = v,
            CardField::Company(v) => content.company = v,
            CardField::JobTitle(v) => content.job_title = v,
            CardField::Bio(v) => content.bio = v,
            CardField::Email(v) => content.email = v,
            CardField::Phone(v) => content.phone = v,
            CardField::Website(v) => content.website = v,
            CardField::Address(v) => content.address = v,
            CardField::AvatarUrl(v) => content.avatar_url = v,
            CardField::CoverUrl(v) => content.cover_url = v,
            CardField::Slug(raw) => {
                let slug = sanitize_slug(&raw);
                content.slug = (!slug.is_empty()).then_some(slug);
            }
            CardField::Theme(v) => content.theme = v,
            CardField::Shape(v) => content.shape = v,
            CardField::LayoutStyle(v) => content.layout.style = v,
            CardField::LayoutAlignment(v) => content.layout.alignment = v,
            CardField::LayoutFont(v) => content.layout.font = v,
            CardField::Published(v) => content.is_published = v,
        }
    }
}
