//! User store - lookups over the users map document.
//!
//! User records are created by sign-up and mutated by profile updates, both
//! of which live in the session manager; this module is the read side plus
//! the raw upsert the manager builds on.

use super::models::User;
use super::{Store, UsersDoc, USERS_KEY};

impl Store {
    pub(crate) fn load_users(&self) -> UsersDoc {
        self.load(USERS_KEY).unwrap_or_default()
    }

    pub async fn get_user_by_id(&self, uid: &str) -> Option<User> {
        self.load_users().get(uid).cloned()
    }

    /// Case-insensitive email lookup; emails are unique within the store.
    pub(crate) fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.load_users()
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    /// The distinguished owner account, identified by the configured email.
    pub async fn get_owner_profile(&self, owner_email: &str) -> Option<User> {
        self.find_user_by_email(owner_email)
    }

    pub(crate) fn upsert_user(&self, user: &User) -> super::error::VaultResult<()> {
        let mut users = self.load_users();
        users.insert(user.uid.clone(), user.clone());
        self.save(USERS_KEY, &users)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{seeded_store, OWNER_EMAIL};

    #[tokio::test]
    async fn test_get_user_by_id() {
        let store = seeded_store();
        let owner = store.get_user_by_id("owner-001").await.unwrap();
        assert_eq!(owner.email, OWNER_EMAIL);
        assert!(store.get_user_by_id("nobody").await.is_none());
    }

    #[tokio::test]
    async fn test_owner_lookup_ignores_email_case() {
        let store = seeded_store();
        let owner = store.get_owner_profile("OWNER@EXAMPLE.COM").await.unwrap();
        assert_eq!(owner.uid, "owner-001");
    }
}
