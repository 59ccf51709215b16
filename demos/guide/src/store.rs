//! The persistence collaborator.
//!
//! An in-memory store stands in for the database. Writes return classified
//! [`StoreError`] values; the configurable [`FailurePolicy`] injects
//! failures so the guide can demonstrate the downstream-failure reply
//! without a real outage.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// A failure signalled by the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or refused the write.
    #[error("the store is unavailable")]
    Unavailable,
    /// The record was structurally acceptable but rejected.
    #[error("the store rejected the record: {0}")]
    Rejected(String),
}

/// When the store should simulate a failed write.
#[derive(Debug, Clone, Copy)]
pub enum FailurePolicy {
    /// Writes always succeed (the test default).
    Never,
    /// Writes always fail.
    Always,
    /// Writes fail with the given probability in `[0, 1]`.
    Random(f64),
}

impl FailurePolicy {
    fn should_fail(self) -> bool {
        match self {
            Self::Never => false,
            Self::Always => true,
            Self::Random(p) => rand::thread_rng().gen::<f64>() < p,
        }
    }
}

/// A stored message.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A stored address.
#[derive(Debug, Clone, Serialize)]
pub struct Address {
    pub id: Uuid,
    pub street: String,
    pub zipcode: String,
    pub city: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
}

/// One contact of a stored user.
#[derive(Debug, Clone, Serialize)]
pub struct Contact {
    pub id: Uuid,
    pub mobile: Option<String>,
    pub email: Option<String>,
}

/// A stored user with contacts.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub age: i64,
    pub contacts: Vec<Contact>,
    pub created_at: DateTime<Utc>,
}

/// Input for [`Store::create_address`].
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub street: String,
    pub zipcode: String,
    pub city: String,
    pub country: String,
}

/// Input for one contact of [`Store::create_user`].
#[derive(Debug, Clone)]
pub struct NewContact {
    pub mobile: Option<String>,
    pub email: Option<String>,
}

/// Input for [`Store::create_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub age: i64,
    pub contacts: Vec<NewContact>,
}

/// The persistence interface consumed by the handlers.
///
/// Handlers receive the store as an explicit `Arc<dyn Store>` handle owned
/// by the process entry point; there is no global instance.
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_message(&self, email: &str, content: &str) -> Result<Message, StoreError>;
    async fn create_address(&self, address: NewAddress) -> Result<Address, StoreError>;
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn list_messages(&self) -> Vec<Message>;
    async fn list_addresses(&self) -> Vec<Address>;
    async fn list_users(&self) -> Vec<User>;

    /// External-lookup check used by async refinement: is this email
    /// already the sender of a stored message?
    async fn email_taken(&self, email: &str) -> bool;
}

/// In-memory [`Store`] implementation.
pub struct MemoryStore {
    failure: FailurePolicy,
    check_delay: Duration,
    messages: Mutex<Vec<Message>>,
    addresses: Mutex<Vec<Address>>,
    users: Mutex<Vec<User>>,
    email_checks: AtomicUsize,
}

impl MemoryStore {
    /// Creates an empty store with the given failure policy and no
    /// simulated lookup latency.
    pub fn new(failure: FailurePolicy) -> Self {
        Self {
            failure,
            check_delay: Duration::ZERO,
            messages: Mutex::new(Vec::new()),
            addresses: Mutex::new(Vec::new()),
            users: Mutex::new(Vec::new()),
            email_checks: AtomicUsize::new(0),
        }
    }

    /// Adds simulated latency to [`Store::email_taken`].
    #[must_use]
    pub const fn with_check_delay(mut self, delay: Duration) -> Self {
        self.check_delay = delay;
        self
    }

    /// Number of times [`Store::email_taken`] has been called.
    pub fn email_checks(&self) -> usize {
        self.email_checks.load(Ordering::SeqCst)
    }

    fn gate(&self) -> Result<(), StoreError> {
        if self.failure.should_fail() {
            Err(StoreError::Unavailable)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_message(&self, email: &str, content: &str) -> Result<Message, StoreError> {
        self.gate()?;
        let message = Message {
            id: Uuid::new_v4(),
            title: email.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.messages
            .lock()
            .expect("messages lock")
            .push(message.clone());
        tracing::info!(email, "stored message");
        Ok(message)
    }

    async fn create_address(&self, address: NewAddress) -> Result<Address, StoreError> {
        self.gate()?;
        let address = Address {
            id: Uuid::new_v4(),
            street: address.street,
            zipcode: address.zipcode,
            city: address.city,
            country: address.country,
            created_at: Utc::now(),
        };
        self.addresses
            .lock()
            .expect("addresses lock")
            .push(address.clone());
        tracing::info!(street = %address.street, "stored address");
        Ok(address)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        self.gate()?;
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            age: user.age,
            contacts: user
                .contacts
                .into_iter()
                .map(|c| Contact {
                    id: Uuid::new_v4(),
                    mobile: c.mobile,
                    email: c.email,
                })
                .collect(),
            created_at: Utc::now(),
        };
        self.users.lock().expect("users lock").push(user.clone());
        tracing::info!(name = %user.name, "stored user");
        Ok(user)
    }

    async fn list_messages(&self) -> Vec<Message> {
        self.messages.lock().expect("messages lock").clone()
    }

    async fn list_addresses(&self) -> Vec<Address> {
        self.addresses.lock().expect("addresses lock").clone()
    }

    async fn list_users(&self) -> Vec<User> {
        self.users.lock().expect("users lock").clone()
    }

    async fn email_taken(&self, email: &str) -> bool {
        self.email_checks.fetch_add(1, Ordering::SeqCst);
        if !self.check_delay.is_zero() {
            tokio::time::sleep(self.check_delay).await;
        }
        let taken = self
            .messages
            .lock()
            .expect("messages lock")
            .iter()
            .any(|m| m.title == email);
        tracing::debug!(email, taken, "email lookup");
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_list_messages() {
        let store = MemoryStore::new(FailurePolicy::Never);
        store.create_message("a@b.com", "hello there").await.unwrap();
        let messages = store.list_messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].title, "a@b.com");
        assert_eq!(messages[0].content, "hello there");
    }

    #[tokio::test]
    async fn test_always_failing_store() {
        let store = MemoryStore::new(FailurePolicy::Always);
        let err = store.create_message("a@b.com", "hello").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable));
        assert!(store.list_messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_email_taken_checks_messages() {
        let store = MemoryStore::new(FailurePolicy::Never);
        assert!(!store.email_taken("a@b.com").await);
        store.create_message("a@b.com", "hello there").await.unwrap();
        assert!(store.email_taken("a@b.com").await);
        assert_eq!(store.email_checks(), 2);
    }

    #[tokio::test]
    async fn test_create_user_with_contacts() {
        let store = MemoryStore::new(FailurePolicy::Never);
        let user = store
            .create_user(NewUser {
                name: "Alice Smith".into(),
                age: 30,
                contacts: vec![NewContact {
                    mobile: Some("0123456789".into()),
                    email: Some("alice@example.com".into()),
                }],
            })
            .await
            .unwrap();
        assert_eq!(user.contacts.len(), 1);
        assert_eq!(store.list_users().await.len(), 1);
    }

    #[tokio::test]
    async fn test_create_address() {
        let store = MemoryStore::new(FailurePolicy::Never);
        store
            .create_address(NewAddress {
                street: "Baker Street".into(),
                zipcode: "NW1".into(),
                city: "London".into(),
                country: "United Kingdom".into(),
            })
            .await
            .unwrap();
        assert_eq!(store.list_addresses().await.len(), 1);
    }
}
