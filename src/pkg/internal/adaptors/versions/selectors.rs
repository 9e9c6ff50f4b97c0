use sqlx::PgConnection;

use crate::pkg::internal::adaptors::versions::spec::ResumeVersionEntry;
use crate::prelude::Result;

pub struct VersionSelector<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> VersionSelector<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        VersionSelector { conn }
    }

    pub async fn list_for_owner(&mut self, owner_id: &str) -> Result<Vec<ResumeVersionEntry>> {
        let rows = sqlx::query_as::<_, ResumeVersionEntry>(
            r#"
            SELECT id, owner_id, name, data, created_at
            FROM resume_versions WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(rows)
    }
}
