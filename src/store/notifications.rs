//! Notification store - fetch-and-filter delivery plus read marking.
//!
//! Notifications are created as side effects of other operations (see
//! `add_comment`) and removed by cascade delete. Delivery is a one-shot
//! query by recipient; there is deliberately no push channel in this scope.

use super::error::VaultResult;
use super::models::Notification;
use super::{NotificationsDoc, Store, NOTIFICATIONS_KEY};

impl Store {
    /// Notifications addressed to `user_id`, newest first.
    pub async fn get_notifications(&self, user_id: &str) -> Vec<Notification> {
        let notifications: NotificationsDoc = self.load(NOTIFICATIONS_KEY).unwrap_or_default();
        notifications
            .into_iter()
            .filter(|n| n.user_id == user_id)
            .collect()
    }

    /// Mark the given notifications read. Ids that match nothing are ignored.
    pub async fn mark_notifications_as_read(&self, ids: &[String]) -> VaultResult<()> {
        let _guard = self.lock();
        let mut notifications: NotificationsDoc =
            self.load(NOTIFICATIONS_KEY).unwrap_or_default();
        let mut changed = false;
        for notification in notifications.iter_mut() {
            if !notification.read && ids.contains(&notification.id) {
                notification.read = true;
                changed = true;
            }
        }
        if changed {
            self.save(NOTIFICATIONS_KEY, &notifications)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::models::NewComment;
    use super::super::test_support::seeded_store;
    use super::*;

    #[tokio::test]
    async fn test_fetch_filters_by_recipient() {
        let store = seeded_store();
        assert_eq!(store.get_notifications("owner-001").await.len(), 1);
        assert!(store.get_notifications("reader-001").await.is_empty());
    }

    #[tokio::test]
    async fn test_newest_notification_is_first() {
        let store = seeded_store();
        store
            .add_comment(NewComment {
                work_id: "work-001".to_string(),
                user_id: "reader-002".to_string(),
                user_name: "Late Reader".to_string(),
                text: "me too".to_string(),
            })
            .await
            .unwrap();

        let list = store.get_notifications("owner-001").await;
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].actor.name, "Late Reader");
    }

    #[tokio::test]
    async fn test_mark_read_ignores_unknown_ids() {
        let store = seeded_store();
        let seeded = store.get_notifications("owner-001").await;
        let target = seeded[0].id.clone();

        store
            .mark_notifications_as_read(&[target.clone(), "notif-missing".to_string()])
            .await
            .unwrap();

        let after = store.get_notifications("owner-001").await;
        assert!(after.iter().find(|n| n.id == target).unwrap().read);
    }

    #[tokio::test]
    async fn test_mark_read_with_no_matches_changes_nothing() {
        let store = seeded_store();
        store
            .mark_notifications_as_read(&["notif-missing".to_string()])
            .await
            .unwrap();
        assert!(!store.get_notifications("owner-001").await[0].read);
    }
}
