use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::keys;
use super::records::ActivityLog;
use super::{KeyValueStore, TypedKey};
use crate::model::{BrandingConfig, SignageData};
use crate::{Error, Result};

pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// 32-bit rolling hash (`h = h * 31 + unit` over UTF-16 code units, wrapping).
///
/// This is NOT a password hash in any security sense. It is kept so existing
/// stored admin passwords keep verifying.
pub fn hash_password(password: &str) -> String {
    let mut h: i32 = 0;
    for unit in password.encode_utf16() {
        h = h.wrapping_mul(31).wrapping_add(unit as i32);
    }
    h.to_string()
}

type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Handle returned by [`PersistenceService::subscribe`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    key: String,
    id: u64,
}

/// Typed access to a [`KeyValueStore`] with change notification
pub struct PersistenceService {
    store: Arc<dyn KeyValueStore>,
    listeners: Mutex<HashMap<String, Vec<(u64, Listener)>>>,
    next_id: AtomicU64,
}

impl PersistenceService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store, listeners: Mutex::new(HashMap::new()), next_id: AtomicU64::new(0) }
    }

    /// Read a value. Missing keys are `None`; unparsable values are a
    /// `StorageError`.
    pub fn get<T: DeserializeOwned>(&self, key: &TypedKey<T>) -> Result<Option<T>> {
        match self.store.get(key.name())? {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|e| {
                log::warn!("stored value for `{}` is malformed: {}", key.name(), e);
                Error::storage(key.name(), format!("malformed JSON: {}", e))
            }),
        }
    }

    pub fn get_or_default<T: DeserializeOwned + Default>(&self, key: &TypedKey<T>) -> Result<T> {
        Ok(self.get(key)?.unwrap_or_default())
    }

    /// Write a value and notify subscribers of that key
    pub fn set<T: Serialize>(&self, key: &TypedKey<T>, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.set_raw(key.name(), value)
    }

    pub fn remove<T>(&self, key: &TypedKey<T>) -> Result<()> {
        self.store.remove(key.name())
    }

    /// Call `listener` with the new value after every successful `set` of `key`
    pub fn subscribe<T, F>(&self, key: &TypedKey<T>, listener: F) -> Subscription
    where
        T: DeserializeOwned + 'static,
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let name = key.name().to_string();
        let wrapped: Listener = {
            let name = name.clone();
            Arc::new(move |value: &Value| match serde_json::from_value::<T>(value.clone()) {
                Ok(v) => listener(&v),
                Err(e) => log::warn!("subscriber for `{}` could not read update: {}", name, e),
            })
        };
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.entry(name.clone()).or_default().push((id, wrapped));
        }
        Subscription { key: name, id }
    }

    pub fn unsubscribe(&self, subscription: &Subscription) {
        if let Ok(mut listeners) = self.listeners.lock() {
            if let Some(list) = listeners.get_mut(&subscription.key) {
                list.retain(|(id, _)| *id != subscription.id);
            }
        }
    }

    /// Untyped read, for tooling
    pub fn get_raw(&self, key: &str) -> Result<Option<Value>> {
        match self.store.get(key)? {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| Error::storage(key, format!("malformed JSON: {}", e))),
        }
    }

    /// Untyped write, for tooling. Subscribers are notified.
    pub fn set_raw(&self, key: &str, value: Value) -> Result<()> {
        self.store.set(key, &value.to_string())?;
        log::debug!("stored `{}`", key);

        // snapshot so listeners may call back into the service
        let listeners: Vec<Listener> = match self.listeners.lock() {
            Ok(l) => l.get(key).map(|v| v.iter().map(|(_, f)| Arc::clone(f)).collect()).unwrap_or_default(),
            Err(_) => Vec::new(),
        };
        for listener in listeners {
            listener(&value);
        }
        Ok(())
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        self.store.keys()
    }

    pub fn save_draft(&self, data: &SignageData) -> Result<()> {
        self.set(&keys::SIGNAGE_DRAFT, data)
    }

    pub fn load_draft(&self) -> Result<Option<SignageData>> {
        self.get(&keys::SIGNAGE_DRAFT)
    }

    pub fn branding(&self) -> Result<BrandingConfig> {
        self.get_or_default(&keys::COMPANY_BRANDING)
    }

    pub fn set_branding(&self, branding: &BrandingConfig) -> Result<()> {
        self.set(&keys::COMPANY_BRANDING, branding)
    }

    /// Store the default admin password on first use
    pub fn ensure_admin_password(&self) -> Result<()> {
        if self.get(&keys::ADMIN_PASSWORD)?.is_none() {
            log::info!("no admin password stored, installing the default");
            self.set(&keys::ADMIN_PASSWORD, &hash_password(DEFAULT_ADMIN_PASSWORD))?;
            self.set(&keys::IS_DEFAULT_PASSWORD, &true)?;
        }
        Ok(())
    }

    pub fn verify_admin_password(&self, candidate: &str) -> Result<bool> {
        let stored = match self.get(&keys::ADMIN_PASSWORD)? {
            Some(h) => h,
            None => hash_password(DEFAULT_ADMIN_PASSWORD),
        };
        Ok(stored == hash_password(candidate))
    }

    pub fn set_admin_password(&self, password: &str) -> Result<()> {
        if password.chars().count() < 6 {
            return Err(Error::ValidationError(
                "admin password must be at least 6 characters".into(),
            ));
        }
        self.set(&keys::ADMIN_PASSWORD, &hash_password(password))?;
        self.set(&keys::IS_DEFAULT_PASSWORD, &(password == DEFAULT_ADMIN_PASSWORD))
    }

    pub fn is_default_password(&self) -> Result<bool> {
        Ok(self.get(&keys::IS_DEFAULT_PASSWORD)?.unwrap_or(true))
    }

    pub fn daily_usage(&self, date: NaiveDate) -> Result<u32> {
        self.get_or_default(&keys::daily_usage(date))
    }

    /// Count one export against `date`, returning the new total
    pub fn record_export(&self, date: NaiveDate) -> Result<u32> {
        let key = keys::daily_usage(date);
        let count = self.get_or_default(&key)?.saturating_add(1);
        self.set(&key, &count)?;
        Ok(count)
    }

    pub fn log_activity(&self, entry: ActivityLog) -> Result<()> {
        let mut logs = self.get_or_default(&keys::ACTIVITY_LOGS)?;
        logs.push(entry);
        self.set(&keys::ACTIVITY_LOGS, &logs)
    }
}

impl std::fmt::Debug for PersistenceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceService").finish_non_exhaustive()
    }
}
