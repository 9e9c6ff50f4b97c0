use sqlx::PgConnection;

use crate::pkg::internal::adaptors::resumes::spec::ResumeRecord;
use crate::pkg::internal::workflow::ResumeStatus;
use crate::prelude::Result;

pub(crate) const COLUMNS: &str = "id, owner_id, status, feedback, version, \
     full_name, email, phone, summary, location, website, \
     experience, education, skills, projects, certifications, updated_at";

pub struct ResumeSelector<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> ResumeSelector<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        ResumeSelector { conn }
    }

    pub async fn get_by_id(&mut self, id: &str) -> Result<Option<ResumeRecord>> {
        let query = format!("SELECT {COLUMNS} FROM resumes WHERE id = $1");
        let row = sqlx::query_as::<_, ResumeRecord>(&query)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(row)
    }

    pub async fn get_by_owner(&mut self, owner_id: &str) -> Result<Option<ResumeRecord>> {
        let query = format!("SELECT {COLUMNS} FROM resumes WHERE owner_id = $1");
        let row = sqlx::query_as::<_, ResumeRecord>(&query)
            .bind(owner_id)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(row)
    }

    /// The review queue reads oldest-first so submissions are not starved.
    pub async fn list_by_status(&mut self, status: ResumeStatus) -> Result<Vec<ResumeRecord>> {
        let query =
            format!("SELECT {COLUMNS} FROM resumes WHERE status = $1 ORDER BY updated_at ASC");
        let rows = sqlx::query_as::<_, ResumeRecord>(&query)
            .bind(status)
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn list_all(&mut self) -> Result<Vec<ResumeRecord>> {
        let query = format!("SELECT {COLUMNS} FROM resumes ORDER BY updated_at DESC");
        let rows = sqlx::query_as::<_, ResumeRecord>(&query)
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn count_all(&mut self) -> Result<i64> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT count(*) FROM resumes")
            .fetch_one(&mut *self.conn)
            .await?)
    }

    pub async fn count_by_status(&mut self, status: ResumeStatus) -> Result<i64> {
        Ok(
            sqlx::query_scalar::<_, i64>("SELECT count(*) FROM resumes WHERE status = $1")
                .bind(status)
                .fetch_one(&mut *self.conn)
                .await?,
        )
    }
}
