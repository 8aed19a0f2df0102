//! Work store - CRUD, view counter and like toggling for uploaded works.

use chrono::Utc;

use super::error::{VaultError, VaultResult};
use super::models::{new_id, NewWork, Work};
use super::{
    CommentsDoc, NotificationsDoc, Store, WorksDoc, COMMENTS_KEY, NOTIFICATIONS_KEY, WORKS_KEY,
};

/// Reader-facing path a work is served under; notifications point here and
/// the cascade delete matches on it.
pub(crate) fn work_link(work_id: &str) -> String {
    format!("/story/{work_id}")
}

impl Store {
    pub(crate) fn load_works(&self) -> WorksDoc {
        self.load(WORKS_KEY).unwrap_or_default()
    }

    /// All works, newest upload first.
    pub async fn get_works(&self) -> Vec<Work> {
        let mut works: Vec<Work> = self.load_works().into_values().collect();
        works.sort_by(|a, b| b.upload_date.cmp(&a.upload_date));
        works
    }

    pub async fn get_work_by_id(&self, id: &str) -> Option<Work> {
        self.load_works().get(id).cloned()
    }

    /// Store a new work with a generated id, the current upload timestamp and
    /// zeroed counters.
    pub async fn add_work(&self, draft: NewWork) -> VaultResult<Work> {
        for (field, value) in [
            ("title", &draft.title),
            ("tagline", &draft.tagline),
            ("fileURL", &draft.file_url),
            ("fileName", &draft.file_name),
            ("ownerId", &draft.owner_id),
        ] {
            if value.trim().is_empty() {
                return Err(VaultError::Validation(format!("{field} is required")));
            }
        }

        let work = Work {
            id: new_id("work"),
            title: draft.title,
            tagline: draft.tagline,
            category: draft.category,
            file_url: draft.file_url,
            file_name: draft.file_name,
            upload_date: Utc::now(),
            owner_id: draft.owner_id,
            cover_image_url: draft.cover_image_url,
            view_count: 0,
            likes: 0,
            like_user_ids: Vec::new(),
        };

        let _guard = self.lock();
        let mut works = self.load_works();
        works.insert(work.id.clone(), work.clone());
        self.save(WORKS_KEY, &works)?;
        tracing::info!(work_id = %work.id, title = %work.title, "work added");
        Ok(work)
    }

    /// Delete a work together with its comments and the notifications that
    /// point at it.
    ///
    /// The three removals are one logical unit but the adapter has no
    /// transactions: if a later step fails the earlier ones stay applied and
    /// the error is reported as-is. Best-effort cascade, no rollback.
    pub async fn delete_work(&self, work: &Work) -> VaultResult<()> {
        let _guard = self.lock();

        let mut works = self.load_works();
        if works.remove(&work.id).is_none() {
            return Err(VaultError::NotFound("work"));
        }
        self.save(WORKS_KEY, &works)?;

        let mut comments: CommentsDoc = self.load(COMMENTS_KEY).unwrap_or_default();
        if comments.remove(&work.id).is_some() {
            self.save(COMMENTS_KEY, &comments)?;
        }

        let link = work_link(&work.id);
        let mut notifications: NotificationsDoc =
            self.load(NOTIFICATIONS_KEY).unwrap_or_default();
        let before = notifications.len();
        notifications.retain(|n| n.link != link);
        if notifications.len() != before {
            self.save(NOTIFICATIONS_KEY, &notifications)?;
        }

        tracing::info!(work_id = %work.id, "work deleted with cascade");
        Ok(())
    }

    /// Unconditional +1. Per-session idempotence (count a given work at most
    /// once per browser session) is the caller's responsibility.
    pub async fn increment_view_count(&self, work_id: &str) -> VaultResult<()> {
        let _guard = self.lock();
        let mut works = self.load_works();
        let work = works
            .get_mut(work_id)
            .ok_or(VaultError::NotFound("work"))?;
        work.view_count += 1;
        self.save(WORKS_KEY, &works)
    }

    /// Toggle `user_id`'s like on a work.
    ///
    /// Membership in `like_user_ids` is the source of truth; `likes` is
    /// re-derived from it after every toggle, so the count can neither drift
    /// from the set nor go negative.
    pub async fn toggle_like(&self, work_id: &str, user_id: &str) -> VaultResult<Work> {
        let _guard = self.lock();
        let mut works = self.load_works();
        let work = works
            .get_mut(work_id)
            .ok_or(VaultError::NotFound("work"))?;

        if let Some(pos) = work.like_user_ids.iter().position(|id| id == user_id) {
            work.like_user_ids.remove(pos);
        } else {
            work.like_user_ids.push(user_id.to_string());
        }
        work.likes = work.like_user_ids.len() as u64;

        let updated = work.clone();
        self.save(WORKS_KEY, &works)?;
        Ok(updated)
    }
}
