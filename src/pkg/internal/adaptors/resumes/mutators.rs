use sqlx::PgConnection;
use uuid::Uuid;

use crate::pkg::internal::adaptors::resumes::selectors::COLUMNS;
use crate::pkg::internal::adaptors::resumes::spec::{ResumeContent, ResumeRecord};
use crate::prelude::{Error, Result};

pub struct ResumeMutator<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> ResumeMutator<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        ResumeMutator { conn }
    }

    /// First save by an owner: the record is created in `draft` and the
    /// owner binding never changes afterwards.
    pub async fn create_draft(
        &mut self,
        owner_id: &str,
        content: &ResumeContent,
    ) -> Result<ResumeRecord> {
        let query = format!(
            r#"
            INSERT INTO resumes (id, owner_id, full_name, email, phone, summary,
                location, website, experience, education, skills, projects, certifications)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ResumeRecord>(&query)
            .bind(Uuid::new_v4().to_string())
            .bind(owner_id)
            .bind(&content.full_name)
            .bind(&content.email)
            .bind(&content.phone)
            .bind(&content.summary)
            .bind(&content.location)
            .bind(&content.website)
            .bind(&content.experience)
            .bind(&content.education)
            .bind(&content.skills)
            .bind(&content.projects)
            .bind(&content.certifications)
            .fetch_one(&mut *self.conn)
            .await;
        match row {
            Ok(record) => Ok(record),
            // two first saves raced on the unique owner binding
            Err(e) if e.as_database_error().is_some_and(|d| d.is_unique_violation()) => {
                Err(Error::ConcurrentModification)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Owner content edit. The version check makes the read-modify-write
    /// atomic: if another writer got there first, the row is gone from
    /// under us and the caller gets `ConcurrentModification`.
    pub async fn update_content(
        &mut self,
        owner_id: &str,
        content: &ResumeContent,
        expected_version: i32,
    ) -> Result<ResumeRecord> {
        let query = format!(
            r#"
            UPDATE resumes
            SET full_name = $3, email = $4, phone = $5, summary = $6,
                location = $7, website = $8, experience = $9, education = $10,
                skills = $11, projects = $12, certifications = $13,
                version = version + 1, updated_at = now()
            WHERE owner_id = $1 AND version = $2
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ResumeRecord>(&query)
            .bind(owner_id)
            .bind(expected_version)
            .bind(&content.full_name)
            .bind(&content.email)
            .bind(&content.phone)
            .bind(&content.summary)
            .bind(&content.location)
            .bind(&content.website)
            .bind(&content.experience)
            .bind(&content.education)
            .bind(&content.skills)
            .bind(&content.projects)
            .bind(&content.certifications)
            .fetch_optional(&mut *self.conn)
            .await?;
        match row {
            Some(record) => Ok(record),
            None => Err(self.missed_write_error("owner_id", owner_id).await?),
        }
    }

    /// Persists a transition produced by the workflow engine. Compare-and-
    /// swap on `version`: the precondition verified at read time must still
    /// hold at write time.
    pub async fn store_transition(
        &mut self,
        record: &ResumeRecord,
        expected_version: i32,
    ) -> Result<ResumeRecord> {
        let query = format!(
            r#"
            UPDATE resumes
            SET status = $2, feedback = $3, version = version + 1, updated_at = now()
            WHERE id = $1 AND version = $4
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ResumeRecord>(&query)
            .bind(&record.id)
            .bind(record.status)
            .bind(&record.feedback)
            .bind(expected_version)
            .fetch_optional(&mut *self.conn)
            .await?;
        match row {
            Some(updated) => Ok(updated),
            None => Err(self.missed_write_error("id", &record.id).await?),
        }
    }

    /// A versioned write that matched no row needs a follow-up read: does the
    /// record still exist under a newer version, or is it gone?
    async fn missed_write_error(&mut self, column: &str, value: &str) -> Result<Error> {
        let query = format!("SELECT version FROM resumes WHERE {column} = $1");
        let current = sqlx::query_scalar::<_, i32>(&query)
            .bind(value)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(classify_missed_write(current, column, value))
    }
}

/// A versioned write that matched no row either raced another writer or
/// targeted a record that no longer exists; tell the caller which.
fn classify_missed_write(current: Option<i32>, column: &str, value: &str) -> Error {
    match current {
        Some(_) => Error::ConcurrentModification,
        None => Error::NotFound(format!("resume with {column} {value} does not exist")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missed_write_with_surviving_row_is_a_concurrent_modification() {
        let err = classify_missed_write(Some(3), "id", "resume-1");
        assert!(matches!(err, Error::ConcurrentModification));
    }

    #[test]
    fn missed_write_with_no_row_is_not_found() {
        match classify_missed_write(None, "id", "resume-1") {
            Error::NotFound(msg) => assert!(msg.contains("resume-1")),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    // Needs a reachable Postgres with migrations applied;
    // run with `cargo test -- --ignored`.
    #[tokio::test]
    #[ignore]
    async fn stale_versioned_write_loses_to_a_competing_commit() {
        use crate::conf::settings;
        use crate::pkg::internal::adaptors::resumes::spec::Experience;
        use crate::pkg::internal::auth::{Role, User};
        use crate::pkg::internal::workflow::{self, Operation};
        use chrono::Utc;
        use sqlx::types::Json;

        let pool = sqlx::PgPool::connect(&settings.database_url).await.unwrap();
        let owner = format!("race-{}", Uuid::new_v4());
        sqlx::query("INSERT INTO users (user_id, email, name, role) VALUES ($1, $2, $3, 'candidate')")
            .bind(&owner)
            .bind(format!("{owner}@example.com"))
            .bind("Race Case")
            .execute(&pool)
            .await
            .unwrap();
        let candidate = User {
            user_id: owner.clone(),
            email: format!("{owner}@example.com"),
            name: "Race Case".into(),
            role: Role::Candidate,
        };
        let content = ResumeContent {
            full_name: "Race Case".into(),
            email: format!("{owner}@example.com"),
            experience: Json(vec![Experience::default()]),
            ..Default::default()
        };

        let mut conn = pool.acquire().await.unwrap();
        let record = ResumeMutator::new(&mut conn)
            .create_draft(&owner, &content)
            .await
            .unwrap();

        // a second first save by the same owner loses the owner binding
        let dup = ResumeMutator::new(&mut conn)
            .create_draft(&owner, &content)
            .await
            .unwrap_err();
        assert!(matches!(dup, Error::ConcurrentModification));

        // two writers read version 1; the first commit wins
        let mut winner = record.clone();
        let mut loser = record.clone();
        workflow::apply(&mut winner, Operation::Submit, &candidate, None, Utc::now()).unwrap();
        workflow::apply(&mut loser, Operation::Submit, &candidate, None, Utc::now()).unwrap();
        ResumeMutator::new(&mut conn)
            .store_transition(&winner, record.version)
            .await
            .unwrap();
        let stale = ResumeMutator::new(&mut conn)
            .store_transition(&loser, record.version)
            .await
            .unwrap_err();
        assert!(matches!(stale, Error::ConcurrentModification));

        // once the row is gone the same miss reads as not-found
        sqlx::query("DELETE FROM resumes WHERE id = $1")
            .bind(&record.id)
            .execute(&mut *conn)
            .await
            .unwrap();
        let gone = ResumeMutator::new(&mut conn)
            .store_transition(&loser, record.version)
            .await
            .unwrap_err();
        assert!(matches!(gone, Error::NotFound(_)));

        sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(&owner)
            .execute(&pool)
            .await
            .unwrap();
    }
}
