//! Session and auth manager.
//!
//! One process-scoped manager owns the persisted session pointer: no pointer
//! means anonymous, a pointer to a uid means authenticated. Every transition
//! is broadcast synchronously to all registered subscribers, and a new
//! subscriber is handed the current state before it starts listening, so a
//! late subscriber never misses the initial value.
//!
//! Passwords are accepted by the sign-up/sign-in surface but never stored or
//! checked; this vault carries no credential store, and password update /
//! reset resolve without persistent effect beyond their success or failure.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use crate::store::error::{VaultError, VaultResult};
use crate::store::models::{new_id, ProfileUpdate, User};
use crate::store::{SessionDoc, Store, SESSION_KEY};

type AuthCallback = Box<dyn Fn(Option<&User>) + Send + Sync>;

struct Subscribers {
    callbacks: Mutex<HashMap<u64, AuthCallback>>,
    next_id: AtomicU64,
}

/// Handle returned by [`SessionManager::subscribe`]; dropping it
/// unsubscribes the callback.
pub struct AuthSubscription {
    subscribers: Weak<Subscribers>,
    id: u64,
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            subscribers
                .callbacks
                .lock()
                .expect("subscriber lock poisoned")
                .remove(&self.id);
        }
    }
}

#[derive(Clone)]
pub struct SessionManager {
    store: Store,
    subscribers: Arc<Subscribers>,
}

impl SessionManager {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            subscribers: Arc::new(Subscribers {
                callbacks: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// The authenticated user, or `None` when anonymous. A session pointer
    /// whose user record has disappeared reads as anonymous.
    pub fn current_user(&self) -> Option<User> {
        let session: SessionDoc = self.store.load(SESSION_KEY)?;
        self.store.load_users().get(&session.uid).cloned()
    }

    /// Register `callback` for auth transitions. The current state is
    /// delivered immediately, then every transition until the returned
    /// subscription is dropped.
    pub fn subscribe(
        &self,
        callback: impl Fn(Option<&User>) + Send + Sync + 'static,
    ) -> AuthSubscription {
        let current = self.current_user();
        callback(current.as_ref());

        let id = self.subscribers.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .callbacks
            .lock()
            .expect("subscriber lock poisoned")
            .insert(id, Box::new(callback));
        AuthSubscription {
            subscribers: Arc::downgrade(&self.subscribers),
            id,
        }
    }

    fn broadcast(&self, user: Option<&User>) {
        let callbacks = self
            .subscribers
            .callbacks
            .lock()
            .expect("subscriber lock poisoned");
        for callback in callbacks.values() {
            callback(user);
        }
    }

    /// Create an account and sign it in.
    ///
    /// Fails with `DuplicateEmail` when the email is already registered; the
    /// existing record is left untouched in that case.
    pub async fn sign_up(&self, email: &str, _password: &str) -> VaultResult<User> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(VaultError::Validation("a valid email is required".into()));
        }

        let user = {
            let _guard = self.store.lock();
            if self.store.find_user_by_email(email).is_some() {
                return Err(VaultError::DuplicateEmail);
            }

            let uid = new_id("user");
            let local_part = email.split('@').next().unwrap_or(email);
            let user = User {
                uid: uid.clone(),
                email: email.to_string(),
                display_name: Some(local_part.to_string()),
                bio: None,
                profile_id: None,
                profile_picture_url: Some(format!("https://picsum.photos/seed/{uid}/200")),
            };
            self.store.upsert_user(&user)?;
            self.store.save(SESSION_KEY, &SessionDoc { uid })?;
            user
        };

        tracing::info!(uid = %user.uid, "user signed up");
        self.broadcast(Some(&user));
        Ok(user)
    }

    /// Sign in an existing account by email. The password is accepted but
    /// not checked against anything.
    pub async fn sign_in(&self, email: &str, _password: &str) -> VaultResult<User> {
        let user = {
            let _guard = self.store.lock();
            let user = self
                .store
                .find_user_by_email(email)
                .ok_or(VaultError::UserNotFound)?;
            self.store.save(
                SESSION_KEY,
                &SessionDoc {
                    uid: user.uid.clone(),
                },
            )?;
            user
        };

        tracing::info!(uid = %user.uid, "user signed in");
        self.broadcast(Some(&user));
        Ok(user)
    }

    /// Clear the session pointer. Idempotent: signing out while anonymous
    /// still succeeds and still broadcasts the anonymous state.
    pub async fn sign_out(&self) -> VaultResult<()> {
        {
            let _guard = self.store.lock();
            self.store.remove(SESSION_KEY)?;
        }
        tracing::info!("user signed out");
        self.broadcast(None);
        Ok(())
    }

    /// Merge profile fields into the signed-in user's record.
    ///
    /// `profile_id` is immutable once set: an attempt to change it is
    /// stripped from the payload rather than rejected, matching the
    /// update-what-you-may contract the UI relies on.
    pub async fn update_profile(&self, mut update: ProfileUpdate) -> VaultResult<User> {
        if update.profile_id.take().is_some() {
            tracing::debug!("profileId ignored in profile update");
        }

        let user = {
            let _guard = self.store.lock();
            let session: SessionDoc = self
                .store
                .load(SESSION_KEY)
                .ok_or(VaultError::NotAuthenticated)?;
            let mut user = self
                .store
                .load_users()
                .get(&session.uid)
                .cloned()
                .ok_or(VaultError::NotAuthenticated)?;

            if let Some(display_name) = update.display_name {
                user.display_name = Some(display_name);
            }
            if let Some(bio) = update.bio {
                user.bio = Some(bio);
            }
            if let Some(url) = update.profile_picture_url {
                user.profile_picture_url = Some(url);
            }

            self.store.upsert_user(&user)?;
            user
        };

        self.broadcast(Some(&user));
        Ok(user)
    }

    /// Accept a password change for the signed-in user. Nothing is stored.
    pub async fn update_password(&self, new_password: &str) -> VaultResult<()> {
        if new_password.is_empty() {
            return Err(VaultError::Validation("password is required".into()));
        }
        if self.current_user().is_none() {
            return Err(VaultError::NotAuthenticated);
        }
        tracing::debug!("password update accepted");
        Ok(())
    }

    /// Accept a password-reset request for a registered email.
    pub async fn forgot_password(&self, email: &str) -> VaultResult<()> {
        if self.store.find_user_by_email(email).is_none() {
            return Err(VaultError::EmailNotFound);
        }
        tracing::debug!(email = %email, "password reset accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::{seeded_store, OWNER_EMAIL};

    fn manager() -> SessionManager {
        SessionManager::new(seeded_store())
    }

    #[tokio::test]
    async fn test_sign_up_creates_user_and_session() {
        let m = manager();
        let user = m.sign_up("new.reader@example.com", "pw").await.unwrap();
        assert_eq!(user.display_name.as_deref(), Some("new.reader"));
        assert_eq!(m.current_user().unwrap().uid, user.uid);
    }

    #[tokio::test]
    async fn test_duplicate_sign_up_leaves_original_untouched() {
        let m = manager();
        let first = m.sign_up("reader@example.com", "pw").await.unwrap();
        m.update_profile(ProfileUpdate {
            bio: Some("original bio".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

        let err = m.sign_up("reader@example.com", "other").await.unwrap_err();
        assert!(matches!(err, VaultError::DuplicateEmail));

        let unchanged = m.store.get_user_by_id(&first.uid).await.unwrap();
        assert_eq!(unchanged.bio.as_deref(), Some("original bio"));
    }

    #[tokio::test]
    async fn test_sign_in_unknown_email_fails() {
        let m = manager();
        let err = m.sign_in("ghost@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, VaultError::UserNotFound));
        assert!(m.current_user().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_returns_to_anonymous() {
        let m = manager();
        m.sign_in(OWNER_EMAIL, "pw").await.unwrap();
        m.sign_out().await.unwrap();
        assert!(m.current_user().is_none());
        // Idempotent from the anonymous state.
        m.sign_out().await.unwrap();
    }

    #[tokio::test]
    async fn test_update_profile_strips_profile_id() {
        let m = manager();
        m.sign_in(OWNER_EMAIL, "pw").await.unwrap();
        let updated = m
            .update_profile(ProfileUpdate {
                profile_id: Some("hijacked".to_string()),
                bio: Some("new bio".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.profile_id.as_deref(), Some("owner-admin"));
        assert_eq!(updated.bio.as_deref(), Some("new bio"));
    }

    #[tokio::test]
    async fn test_update_profile_requires_session() {
        let m = manager();
        let err = m.update_profile(ProfileUpdate::default()).await.unwrap_err();
        assert!(matches!(err, VaultError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_forgot_password_unknown_email() {
        let m = manager();
        assert!(m.forgot_password(OWNER_EMAIL).await.is_ok());
        let err = m.forgot_password("ghost@example.com").await.unwrap_err();
        assert!(matches!(err, VaultError::EmailNotFound));
    }

    #[tokio::test]
    async fn test_update_password_requires_session() {
        let m = manager();
        let err = m.update_password("hunter2").await.unwrap_err();
        assert!(matches!(err, VaultError::NotAuthenticated));
        m.sign_in(OWNER_EMAIL, "pw").await.unwrap();
        assert!(m.update_password("hunter2").await.is_ok());
    }

    #[tokio::test]
    async fn test_subscriber_gets_initial_state_then_transitions() {
        let m = manager();
        let seen: Arc<Mutex<Vec<Option<String>>>> = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        let subscription = m.subscribe(move |user| {
            sink.lock()
                .unwrap()
                .push(user.map(|u| u.email.clone()));
        });

        m.sign_in(OWNER_EMAIL, "pw").await.unwrap();
        m.sign_out().await.unwrap();
        drop(subscription);
        m.sign_in(OWNER_EMAIL, "pw").await.unwrap();

        let seen = seen.lock().unwrap();
        // Initial anonymous replay, sign-in, sign-out; nothing after drop.
        assert_eq!(
            *seen,
            vec![None, Some(OWNER_EMAIL.to_string()), None]
        );
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_authenticated_state() {
        let m = manager();
        m.sign_in(OWNER_EMAIL, "pw").await.unwrap();

        let seen: Arc<Mutex<Vec<Option<String>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _subscription = m.subscribe(move |user| {
            sink.lock().unwrap().push(user.map(|u| u.uid.clone()));
        });

        assert_eq!(*seen.lock().unwrap(), vec![Some("owner-001".to_string())]);
    }
}
