use axum::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::auth::repo_types::{NewUser, StoreError, User};

/// Relational persistence for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Idempotent; safe to call on every start.
    async fn create_table_if_absent(&self) -> Result<(), StoreError>;

    /// Inserts the row inside an open transaction. Nothing is visible to other
    /// readers until [`PendingUser::commit`]; dropping the handle rolls back.
    async fn begin_insert(&self, user: NewUser) -> Result<Box<dyn PendingUser>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn insert(&self, user: NewUser) -> Result<i64, StoreError> {
        let pending = self.begin_insert(user).await?;
        let id = pending.id();
        pending.commit().await?;
        Ok(id)
    }

    async fn find_password_hash_by_email(&self, email: &str) -> Result<Option<String>, StoreError> {
        Ok(self.find_by_email(email).await?.map(|u| u.password_hash))
    }

    /// Releases connections at shutdown.
    async fn close(&self) {}
}

/// An inserted but uncommitted user row.
#[async_trait]
pub trait PendingUser: Send {
    fn id(&self) -> i64;
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

struct PgPendingUser {
    tx: Transaction<'static, Postgres>,
    id: i64,
}

#[async_trait]
impl PendingUser for PgPendingUser {
    fn id(&self) -> i64 {
        self.id
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_table_if_absent(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.db).await?;
        Ok(())
    }

    async fn begin_insert(&self, user: NewUser) -> Result<Box<dyn PendingUser>, StoreError> {
        let mut tx = self.db.begin().await?;
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (name, email, password, image_filename)
            VALUES ($1, $2, $3, $4)
            RETURNING id::BIGINT
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.image_filename)
        .fetch_one(&mut *tx)
        .await?;
        Ok(Box::new(PgPendingUser { tx, id }))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id::BIGINT AS id, name, email, password, image_filename
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_password_hash_by_email(&self, email: &str) -> Result<Option<String>, StoreError> {
        let hash = sqlx::query_scalar::<_, String>(
            r#"
            SELECT password
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(hash)
    }

    async fn close(&self) {
        self.db.close().await;
    }
}
