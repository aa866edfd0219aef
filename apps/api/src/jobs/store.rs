//! Job Store — pluggable, trait-based storage for job applications.
//!
//! Default: `InMemoryJobStore` (process memory, lost on restart).
//! `AppState` holds an `Arc<dyn JobRepository>` so a durable backend can be
//! swapped in without touching the handlers.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{Job, JobPatch, JobStatus, NewJob};

#[async_trait]
pub trait JobRepository: Send + Sync {
    /// All jobs in insertion order.
    async fn list(&self) -> Result<Vec<Job>, AppError>;

    async fn create(&self, new_job: NewJob) -> Result<Job, AppError>;

    /// Returns `None` when no job has this id.
    async fn update(&self, id: &str, patch: JobPatch) -> Result<Option<Job>, AppError>;

    /// Returns `false` when no job has this id.
    async fn delete(&self, id: &str) -> Result<bool, AppError>;
}

/// Vec-backed store. Each operation holds the lock for its whole duration,
/// there is no isolation across operations.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<Vec<Job>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with two sample applications.
    pub fn with_demo_jobs() -> Self {
        let now = Utc::now();
        let demo = [
            (
                "Frontend Developer",
                "Tech Corp",
                "https://example.com/job1",
                JobStatus::Applied,
            ),
            (
                "Full Stack Engineer",
                "StartupXYZ",
                "https://example.com/job2",
                JobStatus::Interviewing,
            ),
        ]
        .into_iter()
        .map(|(title, company, link, status)| Job {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            company: company.to_string(),
            application_link: link.to_string(),
            status,
            created_at: now,
        })
        .collect();

        Self {
            jobs: RwLock::new(demo),
        }
    }
}

#[async_trait]
impl JobRepository for InMemoryJobStore {
    async fn list(&self) -> Result<Vec<Job>, AppError> {
        Ok(self.jobs.read().await.clone())
    }

    async fn create(&self, new_job: NewJob) -> Result<Job, AppError> {
        let job = Job {
            id: Uuid::new_v4().to_string(),
            title: new_job.title,
            company: new_job.company,
            application_link: new_job.application_link,
            status: new_job.status,
            created_at: Utc::now(),
        };

        self.jobs.write().await.push(job.clone());
        debug!("Created job {} ({} at {})", job.id, job.title, job.company);
        Ok(job)
    }

    async fn update(&self, id: &str, patch: JobPatch) -> Result<Option<Job>, AppError> {
        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs.iter_mut().find(|j| j.id == id) else {
            return Ok(None);
        };

        patch.apply(job);
        debug!("Updated job {id}");
        Ok(Some(job.clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let mut jobs = self.jobs.write().await;
        let Some(index) = jobs.iter().position(|j| j.id == id) else {
            return Ok(false);
        };

        jobs.remove(index);
        debug!("Deleted job {id}");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn new_job(title: &str) -> NewJob {
        NewJob {
            title: title.to_string(),
            company: "Acme".to_string(),
            application_link: "https://acme.example/careers".to_string(),
            status: JobStatus::Applied,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_unique_ids_and_timestamp() {
        let store = InMemoryJobStore::new();
        let before = Utc::now();

        let mut ids = HashSet::new();
        for i in 0..50 {
            let job = store.create(new_job(&format!("Role {i}"))).await.unwrap();
            assert!(job.created_at >= before);
            assert!(ids.insert(job.id));
        }
        assert_eq!(store.list().await.unwrap().len(), 50);
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let store = InMemoryJobStore::new();
        for title in ["first", "second", "third"] {
            store.create(new_job(title)).await.unwrap();
        }

        let titles: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|j| j.title)
            .collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_update_unknown_id_returns_none() {
        let store = InMemoryJobStore::new();
        store.create(new_job("a")).await.unwrap();

        let result = store
            .update("missing", JobPatch::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_merges_only_supplied_fields() {
        let store = InMemoryJobStore::new();
        let job = store.create(new_job("Engineer")).await.unwrap();

        let patch = JobPatch {
            company: Some("Globex".to_string()),
            status: Some(JobStatus::Offer),
            ..Default::default()
        };
        let updated = store.update(&job.id, patch).await.unwrap().unwrap();

        assert_eq!(updated.company, "Globex");
        assert_eq!(updated.status, JobStatus::Offer);
        assert_eq!(updated.title, "Engineer");
        assert_eq!(updated.application_link, job.application_link);
        assert_eq!(updated.created_at, job.created_at);
        assert_eq!(store.list().await.unwrap()[0], updated);
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let store = InMemoryJobStore::new();
        let keep = store.create(new_job("keep")).await.unwrap();
        let gone = store.create(new_job("gone")).await.unwrap();

        assert!(store.delete(&gone.id).await.unwrap());
        assert!(!store.delete(&gone.id).await.unwrap());

        let remaining = store.list().await.unwrap();
        assert_eq!(remaining, vec![keep]);
    }

    #[tokio::test]
    async fn test_demo_jobs_seeded() {
        let store = InMemoryJobStore::with_demo_jobs();
        let jobs = store.list().await.unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].title, "Frontend Developer");
        assert_eq!(jobs[1].status, JobStatus::Interviewing);
        assert_ne!(jobs[0].id, jobs[1].id);
    }
}
