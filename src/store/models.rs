//! Store models - records persisted in the vault's key-value documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of tagline slots a settings document always exposes.
pub const TAGLINE_SLOTS: usize = 10;

/// Generate an opaque record id with a kind prefix, e.g. `work-<uuid>`.
pub fn new_id(kind: &str) -> String {
    format!("{kind}-{}", Uuid::new_v4())
}

/// Work category. Serialized with the display labels the documents use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Stories")]
    Story,
    #[serde(rename = "Documentaries")]
    Documentary,
    #[serde(rename = "Articles")]
    Article,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Story => write!(f, "Stories"),
            Category::Documentary => write!(f, "Documentaries"),
            Category::Article => write!(f, "Articles"),
        }
    }
}

/// A reader or the owner account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Immutable once set. Profile updates must never change it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    #[serde(
        default,
        rename = "profilePictureURL",
        skip_serializing_if = "Option::is_none"
    )]
    pub profile_picture_url: Option<String>,
}

/// Fields a signed-in user may change on their own record.
///
/// `profile_id` is accepted in the payload for wire compatibility but is
/// stripped before the merge; it can never be changed once set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_id: Option<String>,
    #[serde(default, rename = "profilePictureURL")]
    pub profile_picture_url: Option<String>,
}

/// A single uploaded creative document and its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    pub id: String,
    pub title: String,
    pub tagline: String,
    pub category: Category,
    #[serde(rename = "fileURL")]
    pub file_url: String,
    pub file_name: String,
    pub upload_date: DateTime<Utc>,
    pub owner_id: String,
    #[serde(
        default,
        rename = "coverImageURL",
        skip_serializing_if = "Option::is_none"
    )]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub view_count: u64,
    /// Always equal to `like_user_ids.len()`; re-derived on every toggle.
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub like_user_ids: Vec<String>,
}

/// Input for creating a work. Id, timestamp and counters are generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWork {
    pub title: String,
    pub tagline: String,
    pub category: Category,
    #[serde(rename = "fileURL")]
    pub file_url: String,
    pub file_name: String,
    pub owner_id: String,
    #[serde(default, rename = "coverImageURL")]
    pub cover_image_url: Option<String>,
}

/// A reader comment on a work.
///
/// `user_name` is a snapshot of the author's display name at post time; it is
/// intentionally not kept in sync with later profile edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub work_id: String,
    pub user_id: String,
    pub user_name: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Input for posting a comment. Id and timestamp are generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub work_id: String,
    pub user_id: String,
    pub user_name: String,
    pub text: String,
}

/// Closed set of social-link icons. The store only validates the identifier;
/// resolving it to a renderable asset is the UI's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocialIcon {
    Facebook,
    Instagram,
    Youtube,
    Reddit,
    Twitter,
    Linkedin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLink {
    pub id: String,
    pub name: String,
    pub url: String,
    pub icon: SocialIcon,
}

/// Singleton site configuration edited by the owner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    #[serde(default)]
    pub cover_pages: Vec<String>,
    /// Fixed-length slot array; padded/truncated to [`TAGLINE_SLOTS`] on read.
    #[serde(default)]
    pub taglines: Vec<String>,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
}

/// Snapshot of who triggered a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationActor {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    /// Recipient uid.
    pub user_id: String,
    pub message: String,
    pub link: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub actor: NotificationActor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_uses_display_labels() {
        assert_eq!(
            serde_json::to_string(&Category::Documentary).unwrap(),
            "\"Documentaries\""
        );
        let back: Category = serde_json::from_str("\"Stories\"").unwrap();
        assert_eq!(back, Category::Story);
    }

    #[test]
    fn test_work_counters_default_when_absent() {
        // Documents written before the counters existed still decode.
        let json = r##"{
            "id": "work-1", "title": "T", "tagline": "t",
            "category": "Articles", "fileURL": "#", "fileName": "a.pdf",
            "uploadDate": "2024-01-01T00:00:00Z", "ownerId": "owner-001"
        }"##;
        let work: Work = serde_json::from_str(json).unwrap();
        assert_eq!(work.view_count, 0);
        assert_eq!(work.likes, 0);
        assert!(work.like_user_ids.is_empty());
    }

    #[test]
    fn test_unknown_social_icon_is_rejected() {
        let json = r#"{"id": "sl-1", "name": "X", "url": "https://x.com", "icon": "Mastodon"}"#;
        assert!(serde_json::from_str::<SocialLink>(json).is_err());
    }

    #[test]
    fn test_new_id_carries_kind_prefix() {
        let id = new_id("work");
        assert!(id.starts_with("work-"));
        assert_ne!(new_id("work"), id);
    }
}
