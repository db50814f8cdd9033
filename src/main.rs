use clap::Parser;
use versequiz::db::Db;
use versequiz::email::ResendEmailSender;
use versequiz::federated::{FederatedConfig, OAuthVerifier, ProviderCredentials};
use versequiz::services::auth::AuthService;
use versequiz::services::quiz::QuizService;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the SQLite database file. Created on first run.
    #[arg(long, env, default_value = "versequiz.db")]
    db_path: String,

    /// The address to bind to.
    #[arg(short, long, env, default_value = "127.0.0.1:1414")]
    address: String,

    /// Public base URL, used in password-reset links and OAuth redirects.
    #[arg(long, env, default_value = "http://127.0.0.1:1414")]
    base_url: String,

    /// Resend API key. Leave empty to turn password-reset emails off.
    #[arg(long, env, default_value = "")]
    resend_api_key: String,

    /// Mark cookies Secure. Turn on when serving over HTTPS.
    #[arg(long, env, default_value_t = false)]
    secure_cookies: bool,

    /// Email of the account to grant admin rights on startup. The account
    /// must already be registered.
    #[arg(long, env, default_value = "")]
    admin_email: String,

    /// Google OAuth client id. Leave empty to hide the Google button.
    #[arg(long, env, default_value = "")]
    google_client_id: String,

    /// Google OAuth client secret.
    #[arg(long, env, default_value = "")]
    google_client_secret: String,

    /// GitHub OAuth client id. Leave empty to hide the GitHub button.
    #[arg(long, env, default_value = "")]
    github_client_id: String,

    /// GitHub OAuth client secret.
    #[arg(long, env, default_value = "")]
    github_client_secret: String,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "tracing=info,axum=info,versequiz=debug".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .init();

    let args = Args::parse();

    let db = Db::new(&args.db_path).await?;

    if !args.admin_email.is_empty() {
        let promoted = db.promote_to_admin(&args.admin_email).await?;
        if !promoted {
            tracing::warn!(email = %args.admin_email, "admin email has no account yet");
        }
    }

    let email = ResendEmailSender::new(args.resend_api_key);
    let auth = AuthService::new(db.clone(), email, args.base_url.clone());
    let quiz = QuizService::new(db.clone());
    let federated = OAuthVerifier::new(FederatedConfig {
        base_url: args.base_url,
        google: ProviderCredentials {
            client_id: args.google_client_id,
            client_secret: args.google_client_secret,
        },
        github: ProviderCredentials {
            client_id: args.github_client_id,
            client_secret: args.github_client_secret,
        },
    });

    let state = versequiz::AppState {
        db,
        auth,
        quiz,
        federated,
        secure_cookies: args.secure_cookies,
    };
    let router = versequiz::router(state);

    let listener = tokio::net::TcpListener::bind(&args.address).await?;
    tracing::info!(address = %args.address, "listening");
    axum::serve(listener, router).await?;

    Ok(())
}
