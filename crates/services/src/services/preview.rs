//! Read-only projection of a draft into what the card looks like.

use db::models::{
    card::{CardContent, CardShape, LayoutAlignment, LayoutFont, LayoutStyle, ThemePalette},
    media_item::{MediaItem, MediaKind},
    review::Review,
    social_link::{SocialLink, SocialPlatform},
};
use serde::Serialize;

const PLACEHOLDER_NAME: &str = "Your Name";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum AvatarPreview {
    Image(String),
    Initials(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    Email,
    Phone,
    Website,
    Address,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactRow {
    pub kind: ContactKind,
    pub value: String,
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocialLinkPreview {
    pub platform: SocialPlatform,
    pub label: &'static str,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaPreview {
    pub kind: MediaKind,
    pub url: String,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewPreview {
    pub reviewer_name: String,
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardPreview {
    pub display_name: String,
    pub subtitle: Option<String>,
    pub bio: Option<String>,
    pub avatar: AvatarPreview,
    pub cover_url: Option<String>,
    pub palette: ThemePalette,
    pub shape: CardShape,
    pub style: LayoutStyle,
    pub alignment: LayoutAlignment,
    pub font: LayoutFont,
    pub contacts: Vec<ContactRow>,
    pub social_links: Vec<SocialLinkPreview>,
    pub media: Vec<MediaPreview>,
    pub reviews: Vec<ReviewPreview>,
    pub average_rating: Option<f32>,
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Up to two initials from the display name, `?` when there is none.
pub fn initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();
    if letters.is_empty() {
        "?".to_string()
    } else {
        letters
    }
}

fn subtitle(job_title: &str, company: &str) -> Option<String> {
    match (non_empty(job_title), non_empty(company)) {
        (Some(role), Some(company)) => Some(format!("{role} at {company}")),
        (Some(role), None) => Some(role),
        (None, Some(company)) => Some(company),
        (None, None) => None,
    }
}

fn contacts(content: &CardContent) -> Vec<ContactRow> {
    let mut rows = Vec::new();
    if let Some(email) = non_empty(&content.email) {
        rows.push(ContactRow {
            kind: ContactKind::Email,
            href: Some(format!("mailto:{email}")),
            value: email,
        });
    }
    if let Some(phone) = non_empty(&content.phone) {
        let dial: String = phone
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();
        rows.push(ContactRow {
            kind: ContactKind::Phone,
            href: Some(format!("tel:{dial}")),
            value: phone,
        });
    }
    if let Some(website) = non_empty(&content.website) {
        rows.push(ContactRow {
            kind: ContactKind::Website,
            href: Some(SocialPlatform::Website.profile_url(&website)),
            value: website,
        });
    }
    if let Some(address) = non_empty(&content.address) {
        rows.push(ContactRow {
            kind: ContactKind::Address,
            value: address,
            href: None,
        });
    }
    rows
}

impl CardPreview {
    /// Pure projection; tolerates empty drafts and empty collections.
    pub fn project(
        content: &CardContent,
        social_links: &[SocialLink],
        media: &[MediaItem],
        reviews: &[Review],
    ) -> Self {
        let display_name = non_empty(&content.title).unwrap_or_else(|| PLACEHOLDER_NAME.to_string());
        let avatar = match content.avatar_url.as_deref().and_then(non_empty) {
            Some(url) => AvatarPreview::Image(url),
            None => AvatarPreview::Initials(initials(&content.title)),
        };

        let mut links: Vec<&SocialLink> = social_links.iter().filter(|l| l.is_active).collect();
        links.sort_by_key(|l| l.display_order);

        let mut gallery: Vec<&MediaItem> = media.iter().collect();
        gallery.sort_by_key(|m| m.display_order);

        let approved: Vec<&Review> = reviews.iter().filter(|r| r.is_approved).collect();
        let average_rating = (!approved.is_empty()).then(|| {
            approved.iter().map(|r| r.rating as f32).sum::<f32>() / approved.len() as f32
        });

        Self {
            display_name,
            subtitle: subtitle(&content.job_title, &content.company),
            bio: non_empty(&content.bio),
            avatar,
            cover_url: content.cover_url.as_deref().and_then(non_empty),
            palette: content.theme.palette(),
            shape: content.shape,
            style: content.layout.style,
            alignment: content.layout.alignment,
            font: content.layout.font,
            contacts: contacts(content),
            social_links: links
                .into_iter()
                .map(|l| SocialLinkPreview {
                    platform: l.platform,
                    label: l.platform.label(),
                    url: l.url.clone(),
                })
                .collect(),
            media: gallery
                .into_iter()
                .map(|m| MediaPreview {
                    kind: m.kind,
                    url: m.url.clone(),
                    caption: m.caption.clone(),
                })
                .collect(),
            reviews: approved
                .into_iter()
                .map(|r| ReviewPreview {
                    reviewer_name: r.reviewer_name.clone(),
                    rating: r.rating,
                    comment: r.comment.clone(),
                })
                .collect(),
            average_rating,
        }
    }

    /// CSS classes derived from shape and layout
    pub fn class_names(&self) -> String {
        format!(
            "card card--{} card--{} card--align-{} card--font-{}",
            self.shape, self.style, self.alignment, self.font
        )
    }

    /// Self-contained HTML fragment. All user text is escaped.
    pub fn render_html(&self) -> String {
        let p = &self.palette;
        let mut html = format!(
            r#"<article class="{}" style="--card-primary:{};--card-secondary:{};--card-background:{};--card-text:{}">"#,
            self.class_names(),
            p.primary,
            p.secondary,
            p.background,
            p.text
        );

        if let Some(cover) = &self.cover_url {
            html.push_str(&format!(
                r#"<div class="card__cover" style="background-image:url('{}')"></div>"#,
                escape_html(cover)
            ));
        }

        match &self.avatar {
            AvatarPreview::Image(url) => html.push_str(&format!(
                r#"<img class="card__avatar" src="{}" alt="{}">"#,
                escape_html(url),
                escape_html(&self.display_name)
            )),
            AvatarPreview::Initials(letters) => html.push_str(&format!(
                r#"<div class="card__avatar card__avatar--initials">{}</div>"#,
                escape_html(letters)
            )),
        }

        html.push_str(&format!(
            r#"<h1 class="card__name">{}</h1>"#,
            escape_html(&self.display_name)
        ));
        if let Some(subtitle) = &self.subtitle {
            html.push_str(&format!(
                r#"<p class="card__subtitle">{}</p>"#,
                escape_html(subtitle)
            ));
        }
        if let Some(bio) = &self.bio {
            html.push_str(&format!(r#"<p class="card__bio">{}</p>"#, escape_html(bio)));
        }

        if !self.contacts.is_empty() {
            html.push_str(r#"<ul class="card__contacts">"#);
            for row in &self.contacts {
                let value = escape_html(&row.value);
                match &row.href {
                    Some(href) => html.push_str(&format!(
                        r#"<li class="card__contact card__contact--{}"><a href="{}">{}</a></li>"#,
                        contact_class(row.kind),
                        escape_html(href),
                        value
                    )),
                    None => html.push_str(&format!(
                        r#"<li class="card__contact card__contact--{}">{}</li>"#,
                        contact_class(row.kind),
                        value
                    )),
                }
            }
            html.push_str("</ul>");
        }

        if !self.social_links.is_empty() {
            html.push_str(r#"<nav class="card__social">"#);
            for link in &self.social_links {
                html.push_str(&format!(
                    r#"<a class="card__social-link card__social-link--{}" href="{}" rel="noopener">{}</a>"#,
                    link.platform,
                    escape_html(&link.url),
                    link.label
                ));
            }
            html.push_str("</nav>");
        }

        if !self.media.is_empty() {
            html.push_str(r#"<section class="card__media">"#);
            for item in &self.media {
                let caption = item.caption.as_deref().map(escape_html).unwrap_or_default();
                match item.kind {
                    MediaKind::Image => html.push_str(&format!(
                        r#"<figure><img src="{}" alt="{}"><figcaption>{}</figcaption></figure>"#,
                        escape_html(&item.url),
                        caption,
                        caption
                    )),
                    MediaKind::Video => html.push_str(&format!(
                        r#"<figure><video src="{}" controls></video><figcaption>{}</figcaption></figure>"#,
                        escape_html(&item.url),
                        caption
                    )),
                }
            }
            html.push_str("</section>");
        }

        if !self.reviews.is_empty() {
            html.push_str(r#"<section class="card__reviews">"#);
            if let Some(avg) = self.average_rating {
                html.push_str(&format!(r#"<p class="card__rating">{avg:.1} / 5</p>"#));
            }
            for review in &self.reviews {
                html.push_str(&format!(
                    r#"<blockquote class="card__review"><p>{}</p><cite>{} ({}/5)</cite></blockquote>"#,
                    review.comment.as_deref().map(escape_html).unwrap_or_default(),
                    escape_html(&review.reviewer_name),
                    review.rating
                ));
            }
            html.push_str("</section>");
        }

        html.push_str("</article>");
        html
    }
}

fn contact_class(kind: ContactKind) -> &'static str {
    match kind {
        ContactKind::Email => "email",
        ContactKind::Phone => "phone",
        ContactKind::Website => "website",
        ContactKind::Address => "address",
    }
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
