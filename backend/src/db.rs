use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use crate::models::{Property, PropertyChanges, PropertyRow};
use crate::schema::properties;

pub type PgPool = Pool<ConnectionManager<PgConnection>>;

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("{0}")]
    Connection(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Query(String),
}

impl From<DieselError> for RepoError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                RepoError::Conflict(info.message().to_string())
            }
            other => RepoError::Query(other.to_string()),
        }
    }
}

/// Access to the `properties` table.
#[async_trait]
pub trait PropertyRepo: Send + Sync {
    /// Every property, newest first.
    async fn list(&self) -> Result<Vec<Property>, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Property>, RepoError>;

    async fn insert(&self, changes: PropertyChanges) -> Result<Property, RepoError>;

    /// Returns whether a row was touched.
    async fn update(&self, id: Uuid, changes: PropertyChanges) -> Result<bool, RepoError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, RepoError>;
}

pub fn create_pool(database_url: &str) -> Result<PgPool, RepoError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
        .build(manager)
        .map_err(|e| RepoError::Connection(e.to_string()))?;
    log::info!("Database connection pool established");
    Ok(pool)
}

pub struct PgPropertyRepo {
    pool: PgPool,
}

impl PgPropertyRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs `SELECT 1` to prove the database is reachable.
    pub async fn ping(&self) -> Result<i32, RepoError> {
        self.run(|conn| {
            diesel::select(diesel::dsl::sql::<diesel::sql_types::Integer>("1")).get_result(conn)
        })
        .await
    }

    async fn run<T, F>(&self, query: F) -> Result<T, RepoError>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> Result<T, DieselError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                log::error!("Failed to check out a database connection: {}", e);
                RepoError::Connection(e.to_string())
            })?;
            query(&mut *conn).map_err(RepoError::from)
        })
        .await
        .map_err(|e| RepoError::Connection(e.to_string()))?
    }
}

#[async_trait]
impl PropertyRepo for PgPropertyRepo {
    async fn list(&self) -> Result<Vec<Property>, RepoError> {
        let rows = self
            .run(|conn| {
                properties::table
                    .order_by(properties::created_at.desc())
                    .select(PropertyRow::as_select())
                    .load::<PropertyRow>(conn)
            })
            .await?;
        Ok(rows.into_iter().map(Property::from).collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Property>, RepoError> {
        let slug = slug.to_string();
        let row = self
            .run(move |conn| {
                properties::table
                    .filter(properties::slug.eq(slug))
                    .select(PropertyRow::as_select())
                    .first::<PropertyRow>(conn)
                    .optional()
            })
            .await?;
        Ok(row.map(Property::from))
    }

    async fn insert(&self, changes: PropertyChanges) -> Result<Property, RepoError> {
        let row = self
            .run(move |conn| {
                diesel::insert_into(properties::table)
                    .values(&changes)
                    .returning(PropertyRow::as_returning())
                    .get_result::<PropertyRow>(conn)
            })
            .await?;
        Ok(Property::from(row))
    }

    async fn update(&self, id: Uuid, changes: PropertyChanges) -> Result<bool, RepoError> {
        let updated = self
            .run(move |conn| {
                diesel::update(properties::table.find(id))
                    .set(&changes)
                    .execute(conn)
            })
            .await?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let deleted = self
            .run(move |conn| diesel::delete(properties::table.find(id)).execute(conn))
            .await?;
        Ok(deleted > 0)
    }
}
