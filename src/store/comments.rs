//! Comment store - per-work comment lists and the owner-notification rule.

use chrono::Utc;

use super::error::{VaultError, VaultResult};
use super::models::{new_id, Comment, NewComment, Notification, NotificationActor};
use super::works::work_link;
use super::{CommentsDoc, Store, COMMENTS_KEY, NOTIFICATIONS_KEY};

impl Store {
    fn load_comments(&self) -> CommentsDoc {
        self.load(COMMENTS_KEY).unwrap_or_default()
    }

    /// Comments on a work in posting order; empty when the work has none.
    pub async fn get_comments(&self, work_id: &str) -> Vec<Comment> {
        self.load_comments().remove(work_id).unwrap_or_default()
    }

    /// Post a comment on an existing work.
    ///
    /// The comment text passes through an HTML sanitizer before storage so a
    /// reader can never persist markup the UI would render. When the
    /// commenter is not the work's owner, a single unread notification for
    /// the owner is written in the same operation.
    pub async fn add_comment(&self, draft: NewComment) -> VaultResult<Comment> {
        if draft.text.trim().is_empty() {
            return Err(VaultError::Validation("text is required".into()));
        }
        if draft.user_name.trim().is_empty() {
            return Err(VaultError::Validation("userName is required".into()));
        }

        let _guard = self.lock();

        // Comments must reference an existing work at creation time; orphans
        // only ever disappear via cascade delete, they are never created.
        let work = self
            .load_works()
            .get(&draft.work_id)
            .cloned()
            .ok_or(VaultError::NotFound("work"))?;

        let comment = Comment {
            id: new_id("comment"),
            work_id: draft.work_id,
            user_id: draft.user_id,
            user_name: draft.user_name,
            text: ammonia::clean(&draft.text),
            created_at: Utc::now(),
        };

        let mut comments = self.load_comments();
        comments
            .entry(comment.work_id.clone())
            .or_default()
            .push(comment.clone());
        self.save(COMMENTS_KEY, &comments)?;

        if work.owner_id != comment.user_id {
            let notification = Notification {
                id: new_id("notif"),
                user_id: work.owner_id.clone(),
                message: format!(
                    "{} commented on your work: \"{}\"",
                    comment.user_name, work.title
                ),
                link: work_link(&work.id),
                read: false,
                created_at: comment.created_at,
                actor: NotificationActor {
                    id: comment.user_id.clone(),
                    name: comment.user_name.clone(),
                },
            };
            let mut notifications: Vec<Notification> =
                self.load(NOTIFICATIONS_KEY).unwrap_or_default();
            // Newest first, matching the fetch order readers see.
            notifications.insert(0, notification);
            self.save(NOTIFICATIONS_KEY, &notifications)?;
        }

        Ok(comment)
    }

    /// Remove one comment from a work's list. No-op when either the work's
    /// list or the comment is absent.
    pub async fn delete_comment(&self, work_id: &str, comment_id: &str) -> VaultResult<()> {
        let _guard = self.lock();
        let mut comments = self.load_comments();
        if let Some(list) = comments.get_mut(work_id) {
            let before = list.len();
            list.retain(|c| c.id != comment_id);
            if list.len() != before {
                self.save(COMMENTS_KEY, &comments)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::seeded_store;
    use super::*;

    fn reader_comment(text: &str) -> NewComment {
        NewComment {
            work_id: "work-001".to_string(),
            user_id: "reader-007".to_string(),
            user_name: "NightOwl".to_string(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_comment_notifies_owner() {
        let store = seeded_store();
        let before = store.get_notifications("owner-001").await.len();

        store.add_comment(reader_comment("loved it")).await.unwrap();

        let after = store.get_notifications("owner-001").await;
        assert_eq!(after.len(), before + 1);
        let newest = &after[0];
        assert!(!newest.read);
        assert_eq!(
            newest.message,
            "NightOwl commented on your work: \"The Clockwork Archive\""
        );
        assert_eq!(newest.link, "/story/work-001");
        assert_eq!(newest.actor.id, "reader-007");
    }

    #[tokio::test]
    async fn test_owner_commenting_creates_no_notification() {
        let store = seeded_store();
        let before = store.get_notifications("owner-001").await.len();

        store
            .add_comment(NewComment {
                work_id: "work-001".to_string(),
                user_id: "owner-001".to_string(),
                user_name: "The Vault Keeper".to_string(),
                text: "thanks for reading".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(store.get_notifications("owner-001").await.len(), before);
    }

    #[tokio::test]
    async fn test_add_comment_on_missing_work_is_rejected() {
        let store = seeded_store();
        let mut orphan = reader_comment("hello?");
        orphan.work_id = "work-gone".to_string();
        let err = store.add_comment(orphan).await.unwrap_err();
        assert!(matches!(err, VaultError::NotFound("work")));
    }

    #[tokio::test]
    async fn test_comment_text_is_sanitized() {
        let store = seeded_store();
        let stored = store
            .add_comment(reader_comment("<script>alert(1)</script>nice <b>work</b>"))
            .await
            .unwrap();
        assert!(!stored.text.contains("<script>"));
        assert!(stored.text.contains("nice"));
    }

    #[tokio::test]
    async fn test_delete_comment_removes_only_target() {
        let store = seeded_store();
        let kept = store.add_comment(reader_comment("keep me")).await.unwrap();

        store.delete_comment("work-001", "comment-001").await.unwrap();

        let remaining = store.get_comments("work-001").await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, kept.id);
    }

    #[tokio::test]
    async fn test_delete_comment_is_noop_when_absent() {
        let store = seeded_store();
        store.delete_comment("work-001", "comment-x").await.unwrap();
        store.delete_comment("work-x", "comment-001").await.unwrap();
        assert_eq!(store.get_comments("work-001").await.len(), 1);
    }
}
