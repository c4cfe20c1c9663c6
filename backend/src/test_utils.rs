//! In-memory stand-ins for the database and the storage bucket.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::Utc;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::db::{PropertyRepo, RepoError};
use crate::models::{Property, PropertyChanges, PropertyRow};
use crate::state::AppState;
use crate::storage::{ObjectStore, StorageError};

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://localhost/propertindo_test".into(),
        bind_address: "127.0.0.1".into(),
        port: 0,
        admin_email: "admin@example.com".into(),
        admin_password: "hunter2".into(),
        session_secret: "test-secret".into(),
        session_ttl_hours: 6,
        cookie_secure: false,
        supabase_url: "https://project.supabase.co".into(),
        supabase_service_key: "service-key".into(),
        storage_bucket: "property-images".into(),
        contact_phone: "6281234567890".into(),
        max_upload_bytes: 1024 * 1024,
    }
}

pub fn test_state() -> (AppState, Arc<MemoryRepo>, Arc<MemoryStore>) {
    let repo = Arc::new(MemoryRepo::default());
    let store = Arc::new(MemoryStore::default());
    let state = AppState::new(test_config(), repo.clone(), store.clone());
    (state, repo, store)
}

fn to_property(id: Uuid, changes: PropertyChanges, features: Option<Vec<String>>) -> Property {
    Property::from(PropertyRow {
        id,
        slug: changes.slug,
        title: changes.title,
        location: changes.location,
        size_m2: changes.size_m2,
        price: changes.price,
        status: changes.status,
        description: changes.description,
        images: changes.images,
        features,
        created_at: Utc::now(),
    })
}

/// Keeps rows in insertion order and enforces slug uniqueness like the
/// `properties_slug_key` index.
#[derive(Default)]
pub struct MemoryRepo {
    rows: Mutex<Vec<Property>>,
    failure: Mutex<Option<String>>,
}

impl MemoryRepo {
    /// Makes every following call fail with `message`.
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    /// Stores `property` as-is, bypassing the write path.
    pub fn seed(&self, property: Property) {
        self.rows.lock().unwrap().push(property);
    }

    fn check(&self) -> Result<(), RepoError> {
        match self.failure.lock().unwrap().as_ref() {
            Some(message) => Err(RepoError::Query(message.clone())),
            None => Ok(()),
        }
    }

    fn conflict(slug: &str) -> RepoError {
        RepoError::Conflict(format!(
            "duplicate key value violates unique constraint \"properties_slug_key\" ({slug})"
        ))
    }
}

#[async_trait]
impl PropertyRepo for MemoryRepo {
    async fn list(&self) -> Result<Vec<Property>, RepoError> {
        self.check()?;
        Ok(self.rows.lock().unwrap().iter().rev().cloned().collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Property>, RepoError> {
        self.check()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|p| p.slug == slug).cloned())
    }

    async fn insert(&self, changes: PropertyChanges) -> Result<Property, RepoError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|p| p.slug == changes.slug) {
            return Err(Self::conflict(&changes.slug));
        }
        let property = to_property(Uuid::new_v4(), changes, None);
        rows.push(property.clone());
        Ok(property)
    }

    async fn update(&self, id: Uuid, changes: PropertyChanges) -> Result<bool, RepoError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|p| p.slug == changes.slug && p.id != id) {
            return Err(Self::conflict(&changes.slug));
        }
        let Some(existing) = rows.iter_mut().find(|p| p.id == id) else {
            return Ok(false);
        };
        let created_at = existing.created_at;
        let features = Some(std::mem::take(&mut existing.features));
        *existing = Property {
            created_at,
            ..to_property(id, changes, features)
        };
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|p| p.id != id);
        Ok(rows.len() < before)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    paths: Mutex<Vec<String>>,
}

impl MemoryStore {
    /// Uploads with exactly this body are rejected.
    pub const FAILING_CONTENT: &'static [u8] = b"fail";

    pub fn stored_paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Bytes,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        if bytes.as_ref() == Self::FAILING_CONTENT {
            return Err(StorageError::Rejected {
                status: 400,
                message: "Bucket not found".into(),
            });
        }
        self.paths.lock().unwrap().push(path.to_string());
        Ok(path.to_string())
    }

    fn public_url(&self, path: &str) -> Option<String> {
        Some(format!("https://storage.test/{path}"))
    }
}
