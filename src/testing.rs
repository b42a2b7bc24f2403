//! In-memory stand-ins for the database and the bucket.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::async_trait;
use bytes::Bytes;

use crate::auth::repo::{PendingUser, UserStore};
use crate::auth::repo_types::{NewUser, StoreError, User};
use crate::config::test_config;
use crate::state::AppState;
use crate::storage::StorageClient;

pub fn fake_state(users: Arc<MemoryUserStore>, storage: Arc<MemoryStorage>) -> AppState {
    AppState::from_parts(Arc::new(test_config()), users, storage)
}

#[derive(Default)]
struct Table {
    rows: Vec<User>,
    next_id: i64,
}

#[derive(Default)]
pub struct MemoryUserStore {
    table: Arc<Mutex<Table>>,
    fail_commits: bool,
    fail_reads: bool,
}

impl MemoryUserStore {
    pub fn failing_commits() -> Self {
        Self {
            fail_commits: true,
            ..Self::default()
        }
    }

    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub fn get(&self, email: &str) -> Option<User> {
        let table = self.table.lock().unwrap();
        table.rows.iter().find(|u| u.email == email).cloned()
    }

    pub fn count(&self, email: &str) -> usize {
        let table = self.table.lock().unwrap();
        table.rows.iter().filter(|u| u.email == email).count()
    }
}

struct MemoryPending {
    table: Arc<Mutex<Table>>,
    user: User,
    fail_commit: bool,
}

#[async_trait]
impl PendingUser for MemoryPending {
    fn id(&self) -> i64 {
        self.user.id
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryPending {
            table,
            user,
            fail_commit,
        } = *self;
        if fail_commit {
            return Err(StoreError::Unavailable(sqlx::Error::PoolClosed));
        }
        let mut table = table.lock().unwrap();
        if table.rows.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict);
        }
        table.rows.push(user);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_table_if_absent(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn begin_insert(&self, user: NewUser) -> Result<Box<dyn PendingUser>, StoreError> {
        let mut table = self.table.lock().unwrap();
        if table.rows.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict);
        }
        table.next_id += 1;
        let user = User {
            id: table.next_id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            image_filename: user.image_filename,
        };
        Ok(Box::new(MemoryPending {
            table: self.table.clone(),
            user,
            fail_commit: self.fail_commits,
        }))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Unavailable(sqlx::Error::PoolTimedOut));
        }
        Ok(self.get(email))
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, (Bytes, String)>>,
    deleted: Mutex<usize>,
    fail_puts: bool,
}

impl MemoryStorage {
    pub fn failing_puts() -> Self {
        Self {
            fail_puts: true,
            ..Self::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<(Bytes, String)> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn deleted(&self) -> usize {
        *self.deleted.lock().unwrap()
    }
}

#[async_trait]
impl StorageClient for MemoryStorage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        if self.fail_puts {
            anyhow::bail!("s3 put_object: AccessDenied");
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (body, content_type.to_string()));
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.objects.lock().unwrap().remove(key);
        *self.deleted.lock().unwrap() += 1;
        Ok(())
    }
}

/// Builds a `multipart/form-data` body; returns the content type header and the body.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> (String, Vec<u8>) {
    let boundary = "profile-auth-test-boundary";
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    if let Some((filename, content_type, bytes)) = file {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"profile\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}
