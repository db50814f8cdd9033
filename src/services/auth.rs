use color_eyre::Result;

use crate::db::models::Account;
use crate::db::Db;
use crate::email::ResendEmailSender;
use crate::names;

// ---------------------------------------------------------------------------
// IdentityProvider trait (DIP: service defines the abstraction it needs)
// ---------------------------------------------------------------------------

#[cfg_attr(test, mockall::automock)]
pub trait IdentityProvider: Send + Sync {
    fn email_exists(&self, email: &str) -> impl std::future::Future<Output = Result<bool>> + Send;

    fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> impl std::future::Future<Output = Result<i64>> + Send;

    fn create_federated_account(
        &self,
        email: &str,
        display_name: &str,
    ) -> impl std::future::Future<Output = Result<i64>> + Send;

    fn find_account_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<Account>>> + Send;

    fn verify_account_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    fn create_account_session(
        &self,
        account_id: i64,
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    fn delete_account_session(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn create_password_reset_token(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>>> + Send;

    fn validate_password_reset_token(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    fn reset_password_with_token(
        &self,
        token: &str,
        new_password: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    fn change_password(
        &self,
        account_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;
}

impl IdentityProvider for Db {
    fn email_exists(&self, email: &str) -> impl std::future::Future<Output = Result<bool>> + Send {
        Db::email_exists(self, email)
    }

    fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> impl std::future::Future<Output = Result<i64>> + Send {
        Db::create_account(self, email, password, display_name)
    }

    fn create_federated_account(
        &self,
        email: &str,
        display_name: &str,
    ) -> impl std::future::Future<Output = Result<i64>> + Send {
        Db::create_federated_account(self, email, display_name)
    }

    fn find_account_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<Account>>> + Send {
        Db::find_account_by_email(self, email)
    }

    fn verify_account_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send {
        Db::verify_account_password(self, email, password)
    }

    fn create_account_session(
        &self,
        account_id: i64,
    ) -> impl std::future::Future<Output = Result<String>> + Send {
        Db::create_account_session(self, account_id)
    }

    fn delete_account_session(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send {
        Db::delete_account_session(self, token)
    }

    fn create_password_reset_token(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>>> + Send {
        Db::create_password_reset_token(self, email)
    }

    fn validate_password_reset_token(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send {
        Db::validate_password_reset_token(self, token)
    }

    fn reset_password_with_token(
        &self,
        token: &str,
        new_password: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send {
        Db::reset_password_with_token(self, token, new_password)
    }

    fn change_password(
        &self,
        account_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send {
        Db::change_password(self, account_id, current_password, new_password)
    }
}

// ---------------------------------------------------------------------------
// EmailSender trait (DIP: service defines the abstraction it needs)
// ---------------------------------------------------------------------------

#[cfg_attr(test, mockall::automock)]
pub trait EmailSender: Send + Sync {
    /// Whether email sending is configured (false in dev mode).
    fn is_enabled(&self) -> bool;

    fn send_password_reset_email(
        &self,
        to_email: &str,
        reset_url: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

// ---------------------------------------------------------------------------
// Outcome enums
// ---------------------------------------------------------------------------

pub enum RegisterOutcome {
    /// Account created and session started. Contains the session token.
    LoggedIn(String),
    /// Required fields were empty.
    EmptyFields,
    /// Email already in use.
    EmailTaken,
    /// Password does not meet minimum requirements.
    WeakPassword,
}

pub enum LoginOutcome {
    /// Login succeeded. Contains the session token.
    Success(String),
    /// Password was incorrect (or email not found).
    InvalidCredentials,
}

pub enum ResetPasswordOutcome {
    Success,
    EmptyPassword,
    WeakPassword,
    InvalidToken,
}

pub enum ChangePasswordOutcome {
    Success,
    EmptyFields,
    WeakPassword,
    IncorrectPassword,
}

const MIN_PASSWORD_LENGTH: usize = 8;

// ---------------------------------------------------------------------------
// AuthService
// ---------------------------------------------------------------------------

pub struct AuthService<R: IdentityProvider = Db, E: EmailSender = ResendEmailSender> {
    repo: R,
    email: E,
    base_url: String,
}

impl<R: IdentityProvider + Clone, E: EmailSender + Clone> Clone for AuthService<R, E> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            email: self.email.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

impl<R: IdentityProvider, E: EmailSender> AuthService<R, E> {
    pub fn new(repo: R, email: E, base_url: String) -> Self {
        Self {
            repo,
            email,
            base_url,
        }
    }

    /// Whether password reset by email is available.
    pub fn email_enabled(&self) -> bool {
        self.email.is_enabled()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let verified = self.repo.verify_account_password(email, password).await?;

        if !verified {
            return Ok(LoginOutcome::InvalidCredentials);
        }

        let account = self.repo.find_account_by_email(email).await?.ok_or_else(|| {
            color_eyre::eyre::eyre!("account not found after password verification")
        })?;

        let session_token = self.repo.create_account_session(account.id).await?;

        Ok(LoginOutcome::Success(session_token))
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<RegisterOutcome> {
        if email.is_empty() || password.is_empty() || display_name.is_empty() {
            return Ok(RegisterOutcome::EmptyFields);
        }

        if password.len() < MIN_PASSWORD_LENGTH {
            return Ok(RegisterOutcome::WeakPassword);
        }

        let exists = self.repo.email_exists(email).await?;
        if exists {
            return Ok(RegisterOutcome::EmailTaken);
        }

        let account_id = self.repo.create_account(email, password, display_name).await?;
        let session_token = self.repo.create_account_session(account_id).await?;

        Ok(RegisterOutcome::LoggedIn(session_token))
    }

    /// Sign in with an identity asserted by an external provider. Reuses the
    /// account that owns the email, or creates a passwordless one.
    pub async fn federated_sign_in(&self, email: &str, display_name: &str) -> Result<String> {
        let account_id = match self.repo.find_account_by_email(email).await? {
            Some(account) => account.id,
            None => {
                self.repo
                    .create_federated_account(email, display_name)
                    .await?
            }
        };

        self.repo.create_account_session(account_id).await
    }

    pub async fn logout(&self, session_id: &str) -> Result<()> {
        self.repo.delete_account_session(session_id).await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<bool> {
        if !self.email_enabled() {
            return Ok(false);
        }

        let token = self.repo.create_password_reset_token(email).await?;

        if let Some(token) = token {
            let reset_url = format!("{}{}", self.base_url, names::admin_reset_password_url(&token));
            if let Err(e) = self
                .email
                .send_password_reset_email(email, &reset_url)
                .await
            {
                // Swallow error to avoid leaking whether the email exists.
                tracing::error!("failed to send password reset email to {email}: {e}");
            }
        }

        Ok(true)
    }

    pub async fn validate_reset_token(&self, token: &str) -> Result<bool> {
        self.repo.validate_password_reset_token(token).await
    }

    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<ResetPasswordOutcome> {
        if new_password.is_empty() {
            return Ok(ResetPasswordOutcome::EmptyPassword);
        }

        if new_password.len() < MIN_PASSWORD_LENGTH {
            return Ok(ResetPasswordOutcome::WeakPassword);
        }

        let success = self
            .repo
            .reset_password_with_token(token, new_password)
            .await?;

        if success {
            Ok(ResetPasswordOutcome::Success)
        } else {
            Ok(ResetPasswordOutcome::InvalidToken)
        }
    }

    pub async fn change_password(
        &self,
        account_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<ChangePasswordOutcome> {
        if current_password.is_empty() || new_password.is_empty() {
            return Ok(ChangePasswordOutcome::EmptyFields);
        }

        if new_password.len() < MIN_PASSWORD_LENGTH {
            return Ok(ChangePasswordOutcome::WeakPassword);
        }

        let changed = self
            .repo
            .change_password(account_id, current_password, new_password)
            .await?;

        if changed {
            Ok(ChangePasswordOutcome::Success)
        } else {
            Ok(ChangePasswordOutcome::IncorrectPassword)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
