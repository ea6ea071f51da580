//! Project repository

use crate::db::DatabasePool;
use crate::models::{CreateProject, Project};
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE, Engine};
use mailsink_common::types::ProjectId;
use mailsink_common::{Error, Result};
use rand::{rngs::OsRng, RngCore};
use tracing::debug;

/// Project repository trait
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn create(&self, input: CreateProject) -> Result<Project>;
    async fn get(&self, id: ProjectId) -> Result<Option<Project>>;
    async fn get_by_api_key(&self, api_key: &str) -> Result<Option<Project>>;
    async fn find_by_smtp_credentials(
        &self,
        smtp_user: &str,
        smtp_pass: &str,
    ) -> Result<Option<Project>>;
    async fn list(&self) -> Result<Vec<Project>>;
    async fn delete(&self, id: ProjectId) -> Result<()>;
    async fn count(&self) -> Result<i64>;
}

/// Database project repository
#[derive(Clone)]
pub struct DbProjectRepository {
    pool: DatabasePool,
}

impl DbProjectRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Generate a random API key (32 random bytes, URL-safe base64)
pub fn generate_api_key() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE.encode(bytes)
}

#[async_trait]
impl ProjectRepository for DbProjectRepository {
    async fn create(&self, input: CreateProject) -> Result<Project> {
        let input = input.normalized()?;
        let api_key = generate_api_key();
        let now = chrono::Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO projects (name, api_key, smtp_user, smtp_pass, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.name)
        .bind(&api_key)
        .bind(&input.smtp_user)
        .bind(&input.smtp_pass)
        .bind(now)
        .execute(self.pool.pool())
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => Error::Conflict(format!(
                "SMTP user '{}' is already used by another project",
                input.smtp_user
            )),
            _ => Error::Database(e.to_string()),
        })?;

        let id = result.last_insert_rowid();
        debug!(project_id = id, name = %input.name, "Project created");

        self.get(id)
            .await?
            .ok_or_else(|| Error::Internal("Failed to create project".to_string()))
    }

    async fn get(&self, id: ProjectId) -> Result<Option<Project>> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    async fn get_by_api_key(&self, api_key: &str) -> Result<Option<Project>> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE api_key = ?")
            .bind(api_key)
            .fetch_optional(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    async fn find_by_smtp_credentials(
        &self,
        smtp_user: &str,
        smtp_pass: &str,
    ) -> Result<Option<Project>> {
        sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE smtp_user = ? AND smtp_pass = ?",
        )
        .bind(smtp_user)
        .bind(smtp_pass)
        .fetch_optional(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))
    }

    async fn list(&self) -> Result<Vec<Project>> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY id")
            .fetch_all(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    async fn delete(&self, id: ProjectId) -> Result<()> {
        let mut tx = self
            .pool
            .pool()
            .begin()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        sqlx::query("DELETE FROM emails WHERE project_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("project {}", id)));
        }

        tx.commit()
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM projects")
            .fetch_one(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }
}
