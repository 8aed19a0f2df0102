//! Vault store - the persistence layer behind every domain operation.
//!
//! Five top-level documents live in the key-value adapter: users (map),
//! works (map), comments (map keyed by work id), site settings (singleton)
//! and notifications (list), plus the session pointer. Each domain operation
//! is a read-modify-write over one or more of these documents, serialized by
//! a per-process mutation lock so every operation is individually atomic
//! against the adapter's native write. Two processes sharing one data
//! directory still race; that limitation is accepted and documented, not
//! fixed here.

pub mod error;
pub mod kv;
pub mod models;

mod comments;
mod notifications;
mod settings;
mod users;
mod works;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::{Duration as ChronoDuration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use error::{VaultError, VaultResult};
use kv::{FileStore, KvStore, MemoryStore};
use models::{
    Category, Comment, Notification, NotificationActor, SiteSettings, SocialIcon, SocialLink,
    User, Work,
};

pub(crate) const USERS_KEY: &str = "users";
pub(crate) const WORKS_KEY: &str = "works";
pub(crate) const COMMENTS_KEY: &str = "comments";
pub(crate) const SESSION_KEY: &str = "session";
pub(crate) const SITE_SETTINGS_KEY: &str = "site_settings";
pub(crate) const NOTIFICATIONS_KEY: &str = "notifications";

/// Map documents use BTreeMap so `list()` order is stable across loads.
pub(crate) type UsersDoc = BTreeMap<String, User>;
pub(crate) type WorksDoc = BTreeMap<String, Work>;
pub(crate) type CommentsDoc = BTreeMap<String, Vec<Comment>>;
pub(crate) type NotificationsDoc = Vec<Notification>;

/// The persisted session pointer: present means authenticated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SessionDoc {
    pub uid: String,
}

/// Handle to the vault's document store. Cheap to clone.
#[derive(Clone)]
pub struct Store {
    kv: Arc<dyn KvStore>,
    mutation_lock: Arc<Mutex<()>>,
}

impl Store {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self {
            kv,
            mutation_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Open a file-backed store rooted at `data_dir`.
    pub fn open(data_dir: impl Into<std::path::PathBuf>) -> VaultResult<Self> {
        Ok(Self::new(Arc::new(FileStore::open(data_dir)?)))
    }

    /// Ephemeral store for tests and demo runs.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub(crate) fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        kv::load(self.kv.as_ref(), key)
    }

    pub(crate) fn save<T: Serialize>(&self, key: &str, value: &T) -> VaultResult<()> {
        kv::save(self.kv.as_ref(), key, value)
    }

    pub(crate) fn remove(&self, key: &str) -> VaultResult<()> {
        self.kv.remove_raw(key)
    }

    /// Serialize a read-modify-write section. Held guards must not live
    /// across an await point; every mutation body below is synchronous.
    pub(crate) fn lock(&self) -> MutexGuard<'_, ()> {
        self.mutation_lock.lock().expect("mutation lock poisoned")
    }

    /// Round-trip a probe document and report how long the adapter took.
    pub fn probe(&self) -> VaultResult<Duration> {
        let start = Instant::now();
        self.save("health_probe", &Utc::now())?;
        self.load::<chrono::DateTime<Utc>>("health_probe")
            .ok_or_else(|| VaultError::Storage("probe document unreadable".into()))?;
        Ok(start.elapsed())
    }

    /// Seed the documented default content for any document that is absent.
    ///
    /// Runs at startup. Each document is seeded at most once: a key that
    /// already holds a blob is left untouched, so existing data is never
    /// clobbered by a restart.
    pub fn seed_if_empty(&self, owner_email: &str, owner_profile_id: &str) -> VaultResult<()> {
        let _guard = self.lock();
        let now = Utc::now();

        if !self.kv.contains(USERS_KEY) {
            let owner = User {
                uid: "owner-001".to_string(),
                email: owner_email.to_string(),
                display_name: Some("The Vault Keeper".to_string()),
                bio: Some(
                    "Curator of this vault - stories, documentaries and articles \
                     from one desk. Step inside."
                        .to_string(),
                ),
                profile_id: Some(owner_profile_id.to_string()),
                profile_picture_url: Some("https://picsum.photos/seed/owner/200".to_string()),
            };
            let mut users = UsersDoc::new();
            users.insert(owner.uid.clone(), owner);
            self.save(USERS_KEY, &users)?;
        }

        if !self.kv.contains(WORKS_KEY) {
            let work = Work {
                id: "work-001".to_string(),
                title: "The Clockwork Archive".to_string(),
                tagline: "A tale of gears and forgotten letters.".to_string(),
                category: Category::Story,
                file_url: "#".to_string(),
                file_name: "clockwork_archive.pdf".to_string(),
                upload_date: now,
                owner_id: "owner-001".to_string(),
                cover_image_url: Some(
                    "https://picsum.photos/seed/work-001/1200/800".to_string(),
                ),
                view_count: 123,
                likes: 0,
                like_user_ids: Vec::new(),
            };
            let mut works = WorksDoc::new();
            works.insert(work.id.clone(), work);
            self.save(WORKS_KEY, &works)?;
        }

        if !self.kv.contains(COMMENTS_KEY) {
            let comment = Comment {
                id: "comment-001".to_string(),
                work_id: "work-001".to_string(),
                user_id: "reader-001".to_string(),
                user_name: "EarlyReader".to_string(),
                text: "What an opening chapter. I need to know what is behind the third door."
                    .to_string(),
                created_at: now,
            };
            let mut comments = CommentsDoc::new();
            comments.insert("work-001".to_string(), vec![comment]);
            self.save(COMMENTS_KEY, &comments)?;
        }

        if !self.kv.contains(SITE_SETTINGS_KEY) {
            self.save(SITE_SETTINGS_KEY, &default_site_settings())?;
        }

        if !self.kv.contains(NOTIFICATIONS_KEY) {
            let seeded = Notification {
                id: models::new_id("notif"),
                user_id: "owner-001".to_string(),
                message: "EarlyReader commented on your work: \"The Clockwork Archive\""
                    .to_string(),
                link: "/story/work-001".to_string(),
                read: false,
                created_at: now - ChronoDuration::minutes(5),
                actor: NotificationActor {
                    id: "reader-001".to_string(),
                    name: "EarlyReader".to_string(),
                },
            };
            self.save(NOTIFICATIONS_KEY, &vec![seeded])?;
        }

        tracing::info!("vault store ready");
        Ok(())
    }
}

fn default_site_settings() -> SiteSettings {
    SiteSettings {
        cover_pages: vec![
            "https://picsum.photos/seed/cover1/1920/1080".to_string(),
            "https://picsum.photos/seed/cover2/1920/1080".to_string(),
            "https://picsum.photos/seed/cover3/1920/1080".to_string(),
        ],
        taglines: vec![
            "Weaving stories one page at a time.".to_string(),
            "Documenting truths the headlines miss.".to_string(),
            "Articles that earn a second look.".to_string(),
            "Where imagination meets the written word.".to_string(),
            "Every vault hides more than it shows.".to_string(),
            "The architect of quiet narratives.".to_string(),
            "Penning the future, remembering the past.".to_string(),
            "A universe of stories awaits.".to_string(),
            "From rough draft to finished world.".to_string(),
            "The journey of a thousand words begins here.".to_string(),
        ],
        social_links: vec![
            SocialLink {
                id: "sl-1".to_string(),
                name: "Facebook".to_string(),
                url: "https://facebook.com".to_string(),
                icon: SocialIcon::Facebook,
            },
            SocialLink {
                id: "sl-2".to_string(),
                name: "Instagram".to_string(),
                url: "https://instagram.com".to_string(),
                icon: SocialIcon::Instagram,
            },
        ],
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_populates_all_documents() {
        let store = test_support::seeded_store();
        assert!(store.kv.contains(USERS_KEY));
        assert!(store.kv.contains(WORKS_KEY));
        assert!(store.kv.contains(COMMENTS_KEY));
        assert!(store.kv.contains(SITE_SETTINGS_KEY));
        assert!(store.kv.contains(NOTIFICATIONS_KEY));
        // The session pointer is never seeded: a fresh vault is anonymous.
        assert!(!store.kv.contains(SESSION_KEY));
    }

    #[test]
    fn test_seed_never_clobbers_existing_data() {
        let store = test_support::seeded_store();

        let mut users: UsersDoc = store.load(USERS_KEY).unwrap();
        users.get_mut("owner-001").unwrap().bio = Some("edited".to_string());
        store.save(USERS_KEY, &users).unwrap();

        store
            .seed_if_empty(test_support::OWNER_EMAIL, test_support::OWNER_PROFILE_ID)
            .unwrap();

        let users: UsersDoc = store.load(USERS_KEY).unwrap();
        assert_eq!(users["owner-001"].bio.as_deref(), Some("edited"));
    }

    #[test]
    fn test_seeded_defaults_are_consistent() {
        let store = test_support::seeded_store();
        let works: WorksDoc = store.load(WORKS_KEY).unwrap();
        let work = &works["work-001"];
        // likes must always equal the id-set length, including in seed data.
        assert_eq!(work.likes as usize, work.like_user_ids.len());

        let settings: SiteSettings = store.load(SITE_SETTINGS_KEY).unwrap();
        assert_eq!(settings.taglines.len(), models::TAGLINE_SLOTS);
    }

    #[test]
    fn test_probe_round_trips() {
        let store = Store::in_memory();
        assert!(store.probe().is_ok());
    }
}
