use sqlx::types::Json;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::pkg::internal::adaptors::resumes::spec::ResumeRecord;
use crate::pkg::internal::adaptors::versions::spec::ResumeVersionEntry;
use crate::prelude::{Error, Result};

pub struct VersionMutator<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> VersionMutator<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        VersionMutator { conn }
    }

    pub async fn create(
        &mut self,
        record: &ResumeRecord,
        name: &str,
    ) -> Result<ResumeVersionEntry> {
        let snapshot = serde_json::to_value(record)?;
        let row = sqlx::query_as::<_, ResumeVersionEntry>(
            r#"
            INSERT INTO resume_versions (id, owner_id, name, data)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, name, data, created_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&record.owner_id)
        .bind(name)
        .bind(Json(snapshot))
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(row)
    }

    /// Owners can only delete their own snapshots.
    pub async fn delete(&mut self, owner_id: &str, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM resume_versions WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&mut *self.conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("version {id} does not exist")));
        }
        Ok(())
    }
}
