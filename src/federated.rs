use color_eyre::eyre::bail;
use color_eyre::Result;
use serde::Deserialize;

use crate::names;

/// External sign-in providers offered on the admin login screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
    Github,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Google, Provider::Github];

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "google" => Some(Self::Google),
            "github" => Some(Self::Github),
            _ => None,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Github => "github",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Github => "GitHub",
        }
    }
}

/// OAuth client credentials for one provider. Empty values disable it.
#[derive(Clone, Default)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ProviderCredentials {
    pub fn configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

#[derive(Clone, Default)]
pub struct FederatedConfig {
    pub base_url: String,
    pub google: ProviderCredentials,
    pub github: ProviderCredentials,
}

/// What the provider asserted about the signed-in person.
#[derive(Debug, Clone)]
pub struct FederatedIdentity {
    pub email: String,
    pub display_name: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct GoogleUserInfo {
    email: String,
    name: Option<String>,
}

#[derive(Deserialize)]
struct GithubUser {
    email: Option<String>,
    name: Option<String>,
    login: String,
}

#[derive(Deserialize)]
struct GithubEmail {
    email: String,
    primary: bool,
}

// GitHub rejects requests without a User-Agent.
const USER_AGENT: &str = concat!("versequiz/", env!("CARGO_PKG_VERSION"));

/// Exchanges OAuth authorization codes for a verified email and display
/// name. One verifier serves every configured provider.
#[derive(Clone)]
pub struct OAuthVerifier {
    http: reqwest::Client,
    config: FederatedConfig,
}

impl OAuthVerifier {
    pub fn new(config: FederatedConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn credentials(&self, provider: Provider) -> &ProviderCredentials {
        match provider {
            Provider::Google => &self.config.google,
            Provider::Github => &self.config.github,
        }
    }

    pub fn is_configured(&self, provider: Provider) -> bool {
        self.credentials(provider).configured()
    }

    fn redirect_uri(&self, provider: Provider) -> String {
        format!(
            "{}{}",
            self.config.base_url,
            names::admin_federated_callback_url(provider.slug())
        )
    }

    /// The provider's consent page URL, or None when the provider is not
    /// configured.
    pub fn authorize_url(&self, provider: Provider, state: &str) -> Option<String> {
        let credentials = self.credentials(provider);
        if !credentials.configured() {
            return None;
        }

        let redirect_uri = self.redirect_uri(provider);

        let url = match provider {
            Provider::Google => format!(
                "https://accounts.google.com/o/oauth2/v2/auth?\
                client_id={}&\
                redirect_uri={}&\
                response_type=code&\
                scope={}&\
                state={}",
                urlencoding::encode(&credentials.client_id),
                urlencoding::encode(&redirect_uri),
                urlencoding::encode("openid email profile"),
                urlencoding::encode(state),
            ),
            Provider::Github => format!(
                "https://github.com/login/oauth/authorize?\
                client_id={}&\
                redirect_uri={}&\
                scope={}&\
                state={}",
                urlencoding::encode(&credentials.client_id),
                urlencoding::encode(&redirect_uri),
                urlencoding::encode("read:user user:email"),
                urlencoding::encode(state),
            ),
        };

        Some(url)
    }

    /// Redeem the callback code with the provider and fetch who signed in.
    pub async fn verify_code(&self, provider: Provider, code: &str) -> Result<FederatedIdentity> {
        let credentials = self.credentials(provider);
        if !credentials.configured() {
            bail!("{} sign-in is not configured", provider.label());
        }

        let token_url = match provider {
            Provider::Google => "https://oauth2.googleapis.com/token",
            Provider::Github => "https://github.com/login/oauth/access_token",
        };

        let redirect_uri = self.redirect_uri(provider);

        let response = self
            .http
            .post(token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::error!("{} token exchange failed: {status} - {text}", provider.slug());
            bail!("{} token exchange returned {status}", provider.label());
        }

        let token: TokenResponse = response.json().await?;

        match provider {
            Provider::Google => self.google_identity(&token.access_token).await,
            Provider::Github => self.github_identity(&token.access_token).await,
        }
    }

    async fn google_identity(&self, access_token: &str) -> Result<FederatedIdentity> {
        let info: GoogleUserInfo = self
            .http
            .get("https://openidconnect.googleapis.com/v1/userinfo")
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let display_name = info.name.unwrap_or_else(|| info.email.clone());

        Ok(FederatedIdentity {
            email: info.email,
            display_name,
        })
    }

    async fn github_identity(&self, access_token: &str) -> Result<FederatedIdentity> {
        let user: GithubUser = self
            .http
            .get("https://api.github.com/user")
            .bearer_auth(access_token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // The profile email is often hidden; fall back to the emails API.
        let email = match user.email {
            Some(email) => email,
            None => self.github_primary_email(access_token).await?,
        };

        let display_name = user.name.unwrap_or(user.login);

        Ok(FederatedIdentity {
            email,
            display_name,
        })
    }

    async fn github_primary_email(&self, access_token: &str) -> Result<String> {
        let emails: Vec<GithubEmail> = self
            .http
            .get("https://api.github.com/user/emails")
            .bearer_auth(access_token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        emails
            .iter()
            .find(|e| e.primary)
            .or_else(|| emails.first())
            .map(|e| e.email.clone())
            .ok_or_else(|| color_eyre::eyre::eyre!("GitHub account has no email address"))
    }
}
