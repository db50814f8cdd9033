use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use color_eyre::Result;
use ulid::Ulid;

use super::models::Account;
use super::Db;

impl Db {
    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<i64> {
        let password_hash = hash_password(password)?;

        let account_id: i64 = sqlx::query_scalar(
            "INSERT INTO accounts (email, password_hash, display_name) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(email)
        .bind(password_hash)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(account_id, email, "account created");
        Ok(account_id)
    }

    /// Create an account without a password, for sign-ins that arrive
    /// through an external provider.
    pub async fn create_federated_account(&self, email: &str, display_name: &str) -> Result<i64> {
        let account_id: i64 = sqlx::query_scalar(
            "INSERT INTO accounts (email, display_name) VALUES (?, ?) RETURNING id",
        )
        .bind(email)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(account_id, email, "federated account created");
        Ok(account_id)
    }

    pub async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT id, email, display_name, is_admin FROM accounts WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = ?)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// Password check. Accounts without a stored hash (federated-only) never
    /// match.
    pub async fn verify_account_password(&self, email: &str, password: &str) -> Result<bool> {
        let stored: Option<Option<String>> =
            sqlx::query_scalar("SELECT password_hash FROM accounts WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        match stored.flatten() {
            Some(hash) => Ok(verify_password(password, &hash)),
            None => Ok(false),
        }
    }

    pub async fn create_account_session(&self, account_id: i64) -> Result<String> {
        let token = Ulid::new().to_string();

        sqlx::query(
            r#"
            INSERT INTO account_sessions (token, account_id, expires_at)
            VALUES (?, ?, datetime('now', '+30 days'))
            "#,
        )
        .bind(&token)
        .bind(account_id)
        .execute(&self.pool)
        .await?;

        tracing::info!(account_id, "session created");
        Ok(token)
    }

    /// Grant admin rights to the account behind `email`. Returns false when
    /// no such account exists.
    pub async fn promote_to_admin(&self, email: &str) -> Result<bool> {
        let updated = sqlx::query("UPDATE accounts SET is_admin = 1 WHERE email = ?")
            .bind(email)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if updated > 0 {
            tracing::info!(email, "account promoted to admin");
        }
        Ok(updated > 0)
    }

    pub async fn account_by_session(&self, token: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT a.id, a.email, a.display_name, a.is_admin
            FROM account_sessions s
            JOIN accounts a ON a.id = s.account_id
            WHERE s.token = ? AND s.expires_at > datetime('now')
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    pub async fn delete_account_session(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM account_sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Mint a password reset token for the account behind `email`. Returns
    /// `None` when no such account exists.
    pub async fn create_password_reset_token(&self, email: &str) -> Result<Option<String>> {
        let account_id: Option<i64> = sqlx::query_scalar("SELECT id FROM accounts WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        let Some(account_id) = account_id else {
            return Ok(None);
        };

        let token = Ulid::new().to_string();
        sqlx::query(
            r#"
            INSERT INTO password_reset_tokens (token, account_id, expires_at)
            VALUES (?, ?, datetime('now', '+24 hours'))
            "#,
        )
        .bind(&token)
        .bind(account_id)
        .execute(&self.pool)
        .await?;

        Ok(Some(token))
    }

    /// Whether a reset token is usable (exists, unexpired, unused).
    pub async fn validate_password_reset_token(&self, token: &str) -> Result<bool> {
        let valid: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM password_reset_tokens
                WHERE token = ? AND used = 0 AND expires_at > datetime('now')
            )
            "#,
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await?;

        Ok(valid)
    }

    /// Set a new password through a reset token, burning the token. Returns
    /// false if the token was invalid, expired, or already used.
    pub async fn reset_password_with_token(&self, token: &str, new_password: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let account_id: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT account_id FROM password_reset_tokens
            WHERE token = ? AND used = 0 AND expires_at > datetime('now')
            "#,
        )
        .bind(token)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(account_id) = account_id else {
            return Ok(false);
        };

        let password_hash = hash_password(new_password)?;
        sqlx::query("UPDATE accounts SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(account_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE password_reset_tokens SET used = 1 WHERE token = ?")
            .bind(token)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(account_id, "password reset via token");
        Ok(true)
    }

    /// Change the password of a signed-in account. Verifies the current
    /// password first; returns false when it does not match.
    pub async fn change_password(
        &self,
        account_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<bool> {
        let stored: Option<Option<String>> =
            sqlx::query_scalar("SELECT password_hash FROM accounts WHERE id = ?")
                .bind(account_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(hash) = stored.flatten() else {
            return Ok(false);
        };
        if !verify_password(current_password, &hash) {
            return Ok(false);
        }

        let new_hash = hash_password(new_password)?;
        sqlx::query("UPDATE accounts SET password_hash = ? WHERE id = ?")
            .bind(new_hash)
            .bind(account_id)
            .execute(&self.pool)
            .await?;

        Ok(true)
    }
}

/// Run argon2 hashing on a dedicated thread with a large stack to avoid
/// stack overflow in debug builds.
fn hash_password(password: &str) -> Result<String> {
    let password = password.to_string();
    std::thread::Builder::new()
        .stack_size(4 * 1024 * 1024) // 4 MB stack
        .spawn(move || {
            let salt = SaltString::generate(&mut OsRng);
            let argon2 = Argon2::default();
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|h| h.to_string())
                .map_err(|e| color_eyre::eyre::eyre!("failed to hash password: {e}"))
        })?
        .join()
        .map_err(|_| color_eyre::eyre::eyre!("hash thread panicked"))?
}

fn verify_password(password: &str, hash: &str) -> bool {
    let password = password.to_string();
    let hash = hash.to_string();
    std::thread::Builder::new()
        .stack_size(4 * 1024 * 1024)
        .spawn(move || {
            let parsed_hash = match PasswordHash::new(&hash) {
                Ok(h) => h,
                Err(_) => return false,
            };
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok()
        })
        .map(|h| h.join().unwrap_or(false))
        .unwrap_or(false)
}
