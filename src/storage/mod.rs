//! Persistence
//!
//! A [`KeyValueStore`] holds JSON strings under flat keys. The
//! [`PersistenceService`] layers typed access on top: every logical
//! collection has a [`TypedKey`] and callers never touch raw JSON.

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use chrono::NaiveDate;

use crate::model::{BrandingConfig, SignageData};
use crate::Result;

mod file;
mod memory;
pub mod records;
mod service;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use records::{
    ActivityLog, BlogPost, DocumentRequest, DocumentStatus, NotificationSettings, SecuritySettings,
    UserRecord, UserRole,
};
pub use service::{hash_password, PersistenceService, Subscription, DEFAULT_ADMIN_PASSWORD};

/// Flat string store; values are JSON documents
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value under `key`. A single call is atomic.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// All keys, sorted
    fn keys(&self) -> Result<Vec<String>>;
}

/// A storage key bound to the type stored under it
pub struct TypedKey<T> {
    name: Cow<'static, str>,
    _type: PhantomData<fn() -> T>,
}

impl<T> TypedKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self { name: Cow::Borrowed(name), _type: PhantomData }
    }

    pub fn owned(name: String) -> Self {
        Self { name: Cow::Owned(name), _type: PhantomData }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Clone for TypedKey<T> {
    fn clone(&self) -> Self {
        Self { name: self.name.clone(), _type: PhantomData }
    }
}

impl<T> fmt::Debug for TypedKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypedKey({})", self.name)
    }
}

/// Every key the application persists
pub mod keys {
    use super::*;

    pub const BLOG_POSTS: TypedKey<Vec<BlogPost>> = TypedKey::new("blogPosts");
    pub const DOCUMENT_REQUESTS: TypedKey<Vec<DocumentRequest>> = TypedKey::new("documentRequests");
    pub const COMPANY_BRANDING: TypedKey<BrandingConfig> = TypedKey::new("companyBranding");
    pub const CURRENT_USER: TypedKey<UserRecord> = TypedKey::new("currentUser");
    pub const ALL_USERS: TypedKey<Vec<UserRecord>> = TypedKey::new("allUsers");
    pub const ACTIVITY_LOGS: TypedKey<Vec<ActivityLog>> = TypedKey::new("activityLogs");
    /// Output of [`hash_password`], never the password itself
    pub const ADMIN_PASSWORD: TypedKey<String> = TypedKey::new("adminPassword");
    pub const IS_DEFAULT_PASSWORD: TypedKey<bool> = TypedKey::new("isDefaultPassword");
    /// RFC 3339 timestamp
    pub const LAST_QUOTA_RESET: TypedKey<String> = TypedKey::new("lastQuotaReset");
    pub const SECURITY_SETTINGS: TypedKey<SecuritySettings> = TypedKey::new("securitySettings");
    pub const NOTIFICATION_SETTINGS: TypedKey<NotificationSettings> = TypedKey::new("notificationSettings");
    /// The explicitly saved sign
    pub const SIGNAGE_DRAFT: TypedKey<SignageData> = TypedKey::new("signageDraft");

    pub const DAILY_USAGE_PREFIX: &str = "dailyUsage_";

    /// Export counter for one day, e.g. `dailyUsage_2024-03-01`
    pub fn daily_usage(date: NaiveDate) -> TypedKey<u32> {
        TypedKey::owned(format!("{}{}", DAILY_USAGE_PREFIX, date.format("%Y-%m-%d")))
    }
}
