use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::pkg::internal::workflow::ResumeStatus;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Experience {
    pub role: String,
    pub company: String,
    pub duration: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub school: String,
    pub year: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub level: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Certification {
    pub name: String,
    pub issuer: String,
    pub year: String,
}

/// Free-form resume content. Not subject to workflow invariants beyond the
/// submit guard; the owner edits it while the record is in `draft` or
/// `changes_requested`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeContent {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub summary: String,
    pub location: String,
    pub website: String,
    pub experience: Json<Vec<Experience>>,
    pub education: Json<Vec<Education>>,
    pub skills: Json<Vec<Skill>>,
    pub projects: Json<Vec<Project>>,
    pub certifications: Json<Vec<Certification>>,
}

impl Default for ResumeContent {
    fn default() -> Self {
        ResumeContent {
            full_name: String::new(),
            email: String::new(),
            phone: String::new(),
            summary: String::new(),
            location: String::new(),
            website: String::new(),
            experience: Json(Vec::new()),
            education: Json(Vec::new()),
            skills: Json(Vec::new()),
            projects: Json(Vec::new()),
            certifications: Json(Vec::new()),
        }
    }
}

/// One record per owner. `status` is only ever changed by the workflow
/// engine; `version` backs the compare-and-swap writes in the mutator.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRecord {
    pub id: String,
    pub owner_id: String,
    pub status: ResumeStatus,
    pub feedback: Option<String>,
    pub version: i32,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub content: ResumeContent,
    pub updated_at: DateTime<Utc>,
}
