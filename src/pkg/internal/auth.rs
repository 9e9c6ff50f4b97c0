use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use std::fmt;
use uuid::Uuid;

use crate::{
    pkg::{
        internal::email::{authtoken::AuthnCodeTemplate, SendEmail},
        server::state::AppState,
    },
    prelude::{Error, Result},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Candidate,
    Mediator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Candidate => "candidate",
            Role::Mediator => "mediator",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Type)]
#[sqlx(type_name = "token_status", rename_all = "lowercase")]
pub enum TokenStatus {
    Pending,
    Verified,
    Rejected,
    Expired,
}

#[derive(FromRow, Debug)]
pub struct AuthToken {
    pub token: Uuid,
    pub user_id: String,
    pub code: String,
    pub expiry: DateTime<Utc>,
    pub status: TokenStatus,
}

#[derive(FromRow, Serialize, Debug, Clone)]
pub struct User {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl User {
    /// Signup always produces candidates; reviewer accounts are seeded by
    /// migration and never created through this path.
    pub async fn create(state: &AppState, email: &str, name: &str) -> Result<Self> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, user_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE
            SET name = $2
            RETURNING user_id, email, name, role
            "#,
        )
        .bind(email)
        .bind(name)
        .bind(Uuid::new_v4().to_string())
        .fetch_one(&*state.db_pool)
        .await?;
        Ok(user)
    }

    pub async fn retrieve(state: &AppState, email: &str) -> Result<Option<Self>> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT user_id, email, name, role FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&*state.db_pool)
        .await?)
    }

    pub async fn count(state: &AppState) -> Result<i64> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT count(*) FROM users")
            .fetch_one(&*state.db_pool)
            .await?)
    }

    pub fn is_reviewer(&self) -> bool {
        matches!(self.role, Role::Mediator | Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub async fn issue_token(&self, state: &AppState) -> Result<()> {
        let code = AuthToken::generate_code();
        tracing::debug!("issued code for {}", &self.email);
        sqlx::query(
            r#"
            INSERT INTO tokens (user_id, code, expiry, status)
            VALUES ($1, $2, now() + interval '1 hour', $3)
            "#,
        )
        .bind(&self.user_id)
        .bind(&code)
        .bind(TokenStatus::Pending)
        .execute(&*state.db_pool)
        .await?;
        AuthnCodeTemplate {
            name: &self.name,
            code: &code,
        }
        .send(&self.email)?;
        Ok(())
    }
}

impl AuthToken {
    fn generate_code() -> String {
        let mut rng = rand::rng();
        (0..6)
            .map(|_| rng.random_range(0..10).to_string())
            .collect()
    }

    pub async fn issue_user_token(state: &AppState, email: &str, name: &str) -> Result<User> {
        let user = User::create(state, email, name).await?;
        user.issue_token(state).await?;
        Ok(user)
    }

    /// Exchanges a pending code for a verified session token. A wrong code
    /// rejects the pending token; a missing one triggers a fresh issue.
    pub async fn verify_code(state: &AppState, email: &str, code: &str) -> Result<(User, Uuid)> {
        let pool = &*state.db_pool;
        let user = User::retrieve(state, email)
            .await?
            .ok_or(Error::Unauthorized)?;
        let token = sqlx::query_as::<_, AuthToken>(
            r#"
            SELECT token, user_id, code, expiry, status FROM tokens
            WHERE user_id = $1 AND status = $2 AND expiry > now()
            ORDER BY expiry DESC
            LIMIT 1
            "#,
        )
        .bind(&user.user_id)
        .bind(TokenStatus::Pending)
        .fetch_optional(pool)
        .await?;
        let Some(token) = token else {
            user.issue_token(state).await?;
            return Err(Error::ValidationFailed(
                "no active code found, a new one has been sent".into(),
            ));
        };
        if token.code != code {
            sqlx::query("UPDATE tokens SET status = $2 WHERE token = $1")
                .bind(token.token)
                .bind(TokenStatus::Rejected)
                .execute(pool)
                .await?;
            return Err(Error::Unauthorized);
        }
        sqlx::query("UPDATE tokens SET status = $2 WHERE token = $1")
            .bind(token.token)
            .bind(TokenStatus::Verified)
            .execute(pool)
            .await?;
        Ok((user, token.token))
    }

    pub async fn check_token_validity(state: &AppState, token_str: &str) -> Result<User> {
        let pool = &*state.db_pool;
        let token_str = token_str
            .parse::<Uuid>()
            .map_err(|_| Error::Unauthorized)?;

        tracing::debug!("verifying session token");
        let token = sqlx::query_as::<_, AuthToken>(
            r#"
            SELECT token, user_id, code, expiry, status
            FROM tokens
            WHERE token = $1 AND status = $2 AND expiry > now()
            "#,
        )
        .bind(token_str)
        .bind(TokenStatus::Verified)
        .fetch_optional(pool)
        .await?;
        if let Some(token) = token {
            let user = sqlx::query_as::<_, User>(
                "SELECT user_id, email, name, role FROM users WHERE user_id = $1",
            )
            .bind(&token.user_id)
            .fetch_one(pool)
            .await?;
            Ok(user)
        } else {
            Err(Error::Unauthorized)
        }
    }

    pub async fn expire_all(state: &AppState, user_id: &str) -> Result<()> {
        sqlx::query("UPDATE tokens SET status = $2 WHERE user_id = $3 AND status = $1")
            .bind(TokenStatus::Verified)
            .bind(TokenStatus::Expired)
            .bind(user_id)
            .execute(&*state.db_pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..32 {
            let code = AuthToken::generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn reviewer_roles() {
        let mut user = User {
            user_id: "u".into(),
            email: "u@example.com".into(),
            name: "u".into(),
            role: Role::Candidate,
        };
        assert!(!user.is_reviewer());
        user.role = Role::Mediator;
        assert!(user.is_reviewer() && !user.is_admin());
        user.role = Role::Admin;
        assert!(user.is_reviewer() && user.is_admin());
    }
}
