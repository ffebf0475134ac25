//! In-memory [`CredentialStore`] for service and handler tests.
//!
//! Counts every call, can be told to fail or stall specific operations, and
//! can simulate the lookup/insert race by hiding existing rows from lookups.

use crate::database::models::Principal;
use crate::repositories::{CredentialStore, StoreError, UniqueField};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Default)]
pub struct SpyStore {
    principals: Mutex<HashMap<String, Principal>>,
    calls: AtomicUsize,
    fail_set_online: AtomicBool,
    fail_lookups: AtomicBool,
    hide_from_lookups: AtomicBool,
    stall: Mutex<Option<Duration>>,
}

impl SpyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of trait calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.principals.lock().unwrap().len()
    }

    pub fn get(&self, id: &str) -> Option<Principal> {
        self.principals.lock().unwrap().get(id).cloned()
    }

    pub fn fail_set_online(&self) {
        self.fail_set_online.store(true, Ordering::SeqCst);
    }

    pub fn fail_lookups(&self) {
        self.fail_lookups.store(true, Ordering::SeqCst);
    }

    /// Lookups report nothing while inserts still see existing rows, as when a
    /// concurrent registration lands between the check and the insert.
    pub fn hide_from_lookups(&self) {
        self.hide_from_lookups.store(true, Ordering::SeqCst);
    }

    /// Every call sleeps this long before answering.
    pub fn stall_for(&self, delay: Duration) {
        *self.stall.lock().unwrap() = Some(delay);
    }

    async fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let stall = *self.stall.lock().unwrap();
        if let Some(delay) = stall {
            tokio::time::sleep(delay).await;
        }
    }

    fn lookup<F>(&self, matches: F) -> Result<Option<Principal>, StoreError>
    where
        F: Fn(&Principal) -> bool,
    {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        if self.hide_from_lookups.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self
            .principals
            .lock()
            .unwrap()
            .values()
            .find(|p| matches(p))
            .cloned())
    }
}

#[async_trait]
impl CredentialStore for SpyStore {
    async fn create(&self, principal: &Principal) -> Result<(), StoreError> {
        self.enter().await;
        let mut principals = self.principals.lock().unwrap();
        if principals.values().any(|p| p.username == principal.username) {
            return Err(StoreError::Duplicate {
                field: UniqueField::Username,
            });
        }
        if principals.values().any(|p| p.email == principal.email) {
            return Err(StoreError::Duplicate {
                field: UniqueField::Email,
            });
        }
        principals.insert(principal.id.clone(), principal.clone());
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Principal>, StoreError> {
        self.enter().await;
        self.lookup(|p| p.username == username)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError> {
        self.enter().await;
        self.lookup(|p| p.email == email)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Principal>, StoreError> {
        self.enter().await;
        self.lookup(|p| p.id == id)
    }

    async fn set_online(&self, id: &str) -> Result<(), StoreError> {
        self.enter().await;
        if self.fail_set_online.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write rejected".to_string()));
        }
        if let Some(principal) = self.principals.lock().unwrap().get_mut(id) {
            principal.is_online = true;
            principal.updated_at = Utc::now();
        }
        Ok(())
    }
}
