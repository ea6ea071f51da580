//! Email repository

use crate::db::DatabasePool;
use crate::models::{CreateEmail, Email, EmailSummary};
use async_trait::async_trait;
use mailsink_common::types::{EmailId, ProjectId};
use mailsink_common::{Error, Result};
use sqlx::types::Json;

/// Email repository trait
#[async_trait]
pub trait EmailRepository: Send + Sync {
    /// Store a captured email
    async fn create(&self, input: CreateEmail) -> Result<EmailId>;

    /// Get an email by ID
    async fn get(&self, id: EmailId) -> Result<Option<Email>>;

    /// List emails newest first, optionally restricted to one project
    async fn list(
        &self,
        project_id: Option<ProjectId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EmailSummary>>;

    /// Count emails, optionally restricted to one project
    async fn count(&self, project_id: Option<ProjectId>) -> Result<i64>;

    /// Delete an email
    async fn delete(&self, id: EmailId) -> Result<()>;

    /// Delete every email of a project, returning how many were removed
    async fn purge(&self, project_id: ProjectId) -> Result<u64>;
}

/// SQLite email repository implementation
#[derive(Clone)]
pub struct DbEmailRepository {
    pool: DatabasePool,
}

impl DbEmailRepository {
    /// Create a new repository
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmailRepository for DbEmailRepository {
    async fn create(&self, input: CreateEmail) -> Result<EmailId> {
        let result = sqlx::query(
            r#"
            INSERT INTO emails (
                project_id, from_address, to_addresses, subject, body, raw, received_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(input.project_id)
        .bind(&input.from_address)
        .bind(Json(&input.to_addresses))
        .bind(&input.subject)
        .bind(&input.body)
        .bind(&input.raw)
        .bind(input.received_at)
        .execute(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }

    async fn get(&self, id: EmailId) -> Result<Option<Email>> {
        sqlx::query_as::<_, Email>("SELECT * FROM emails WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    async fn list(
        &self,
        project_id: Option<ProjectId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EmailSummary>> {
        sqlx::query_as::<_, EmailSummary>(
            r#"
            SELECT id, project_id, from_address, to_addresses, subject, received_at
            FROM emails
            WHERE (?1 IS NULL OR project_id = ?1)
            ORDER BY received_at DESC, id DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(project_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))
    }

    async fn count(&self, project_id: Option<ProjectId>) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM emails WHERE (?1 IS NULL OR project_id = ?1)")
            .bind(project_id)
            .fetch_one(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    async fn delete(&self, id: EmailId) -> Result<()> {
        let result = sqlx::query("DELETE FROM emails WHERE id = ?")
            .bind(id)
            .execute(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("email {}", id)));
        }
        Ok(())
    }

    async fn purge(&self, project_id: ProjectId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM emails WHERE project_id = ?")
            .bind(project_id)
            .execute(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateProject;
    use crate::repository::projects::{DbProjectRepository, ProjectRepository};
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;

    async fn setup() -> (DbEmailRepository, ProjectId, ProjectId) {
        let db = DatabasePool::in_memory().await.unwrap();
        let projects = DbProjectRepository::new(db.clone());
        let alpha = projects
            .create(CreateProject {
                name: "Alpha".to_string(),
                smtp_user: "alpha".to_string(),
                smtp_pass: "a".to_string(),
            })
            .await
            .unwrap();
        let beta = projects
            .create(CreateProject {
                name: "Beta".to_string(),
                smtp_user: "beta".to_string(),
                smtp_pass: "b".to_string(),
            })
            .await
            .unwrap();
        (DbEmailRepository::new(db), alpha.id, beta.id)
    }

    fn email(project_id: ProjectId, subject: &str, minutes_ago: i64) -> CreateEmail {
        CreateEmail {
            project_id,
            from_address: "a@x".to_string(),
            to_addresses: vec!["b@y".to_string(), "c@z".to_string()],
            subject: subject.to_string(),
            body: format!("Subject: {}\r\nHello\r\n", subject),
            raw: format!("Subject: {}\r\nHello\r\n.\r\n", subject),
            received_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (repo, alpha, _) = setup().await;
        let id = repo.create(email(alpha, "Hi", 0)).await.unwrap();

        let stored = repo.get(id).await.unwrap().unwrap();
        assert_eq!(stored.project_id, alpha);
        assert_eq!(stored.from_address, "a@x");
        assert_eq!(stored.recipients(), ["b@y".to_string(), "c@z".to_string()]);
        assert_eq!(stored.subject, "Hi");
        assert_eq!(stored.raw, "Subject: Hi\r\nHello\r\n.\r\n");
    }

    #[tokio::test]
    async fn test_list_newest_first_and_filtered() {
        let (repo, alpha, beta) = setup().await;
        repo.create(email(alpha, "old", 10)).await.unwrap();
        repo.create(email(alpha, "new", 1)).await.unwrap();
        repo.create(email(beta, "other", 5)).await.unwrap();

        let all: Vec<String> = repo
            .list(None, 50, 0)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.subject)
            .collect();
        assert_eq!(all, vec!["new", "other", "old"]);

        let alpha_only: Vec<String> = repo
            .list(Some(alpha), 50, 0)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.subject)
            .collect();
        assert_eq!(alpha_only, vec!["new", "old"]);

        let paged = repo.list(Some(alpha), 1, 1).await.unwrap();
        assert_eq!(paged.len(), 1);
        assert_eq!(paged[0].subject, "old");

        assert_eq!(repo.count(None).await.unwrap(), 3);
        assert_eq!(repo.count(Some(beta)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_and_purge() {
        let (repo, alpha, beta) = setup().await;
        let first = repo.create(email(alpha, "one", 2)).await.unwrap();
        repo.create(email(alpha, "two", 1)).await.unwrap();
        repo.create(email(beta, "three", 0)).await.unwrap();

        repo.delete(first).await.unwrap();
        assert!(repo.get(first).await.unwrap().is_none());
        assert_eq!(repo.delete(first).await.unwrap_err().code(), "NOT_FOUND");

        assert_eq!(repo.purge(alpha).await.unwrap(), 1);
        assert_eq!(repo.count(Some(alpha)).await.unwrap(), 0);
        assert_eq!(repo.count(Some(beta)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_project_rejected() {
        let (repo, _, _) = setup().await;
        let err = repo.create(email(9999, "orphan", 0)).await.unwrap_err();
        assert_eq!(err.code(), "DATABASE_ERROR");
    }
}
