use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::dto::SessionInfo;
use crate::jobs::repo::Job;

/// Job-posting form body. Fields default to empty so a missing field is
/// reported with a flash message instead of a 422.
#[derive(Debug, Deserialize)]
pub struct JobForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Checkbox: present ("on") when ticked, absent otherwise.
    #[serde(default)]
    pub is_paid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct JobListItem {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub category: String,
    pub is_paid: bool,
    pub date_posted: OffsetDateTime,
}

impl From<Job> for JobListItem {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            title: job.title,
            company: job.company,
            location: job.location,
            category: job.category,
            is_paid: job.is_paid,
            date_posted: job.date_posted,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobDetails {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub category: String,
    pub posted_by: Uuid,
    pub is_paid: bool,
    pub date_posted: OffsetDateTime,
}

impl From<Job> for JobDetails {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            title: job.title,
            company: job.company,
            location: job.location,
            description: job.description,
            category: job.category,
            posted_by: job.posted_by,
            is_paid: job.is_paid,
            date_posted: job.date_posted,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub flash: Option<String>,
    pub jobs: Vec<JobListItem>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub user: SessionInfo,
    pub flash: Option<String>,
    pub jobs: Vec<JobListItem>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub jobs: Vec<JobListItem>,
}
