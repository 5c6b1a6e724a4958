//! clipfeed - a command-line client for the clipfeed content-sharing API.
//!
//! Signs in against the remote API, keeps the session alive through
//! transparent token refresh, and browses profiles and the shared-content
//! feed from the terminal.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use clipfeed_core::models::{AuthData, ContentItem, SignInRequest, SignUpRequest, User};
use clipfeed_core::{
    ApiClient, Config, CredentialStore, Envelope, FileStore, KeyringStore, SessionManager,
    TokenStore,
};

/// Items per feed page.
const FEED_PAGE_SIZE: u64 = 12;

const USAGE: &str = "usage: clipfeed <command>

commands:
  signin         sign in with email and password
  signup         create an account
  status         show the current session state
  whoami         fetch and print your profile
  feed [page]    browse the shared-content feed
  signout        sign out and clear stored credentials";

/// Initialize the tracing subscriber for logging.
/// Use RUST_LOG to control the level (e.g. RUST_LOG=debug).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let mut config = Config::load()?;
    let base_url = config.api_url();
    debug!(url = %base_url, "using API base URL");

    let store: Arc<dyn CredentialStore> = if std::env::var("CLIPFEED_KEYRING").as_deref() == Ok("1")
    {
        Arc::new(KeyringStore::new("clipfeed"))
    } else {
        Arc::new(FileStore::new(Config::credentials_path()?))
    };
    let tokens = TokenStore::new(store);
    let session = Arc::new(SessionManager::new(&base_url, tokens));
    let client = ApiClient::new(&base_url, Arc::clone(&session))?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("signin") => signin(&client, &session, &mut config).await,
        Some("signup") => signup(&client, &session).await,
        Some("status") => status(&session).await,
        Some("whoami") => whoami(&client, &session).await,
        Some("feed") => {
            let page = args.get(1).and_then(|p| p.parse().ok()).unwrap_or(1);
            feed(&client, &session, page).await
        }
        Some("signout") => signout(&session).await,
        _ => {
            eprintln!("{}", USAGE);
            Ok(())
        }
    }
}

async fn signin(client: &ApiClient, session: &Arc<SessionManager>, config: &mut Config) -> Result<()> {
    let email = prompt("Email", config.last_email.as_deref())?;
    let password = rpassword::prompt_password("Password: ")?;

    let body = SignInRequest {
        email: email.clone(),
        password,
    };
    let envelope: Envelope<AuthData> = client.post("/auth/signin", &body).await?;

    match envelope.into_result() {
        Ok(auth) => {
            let name = auth.user.name.clone();
            session
                .login(auth.user, &auth.access_token, &auth.refresh_token)
                .await?;
            config.last_email = Some(email);
            config.save()?;
            println!("Signed in as {}", name);
        }
        Err(message) => println!("Sign-in failed: {}", message),
    }
    Ok(())
}

async fn signup(client: &ApiClient, session: &Arc<SessionManager>) -> Result<()> {
    let name = prompt("Name", None)?;
    let email = prompt("Email", None)?;
    let password = rpassword::prompt_password("Password: ")?;

    let body = SignUpRequest {
        name,
        email,
        password,
    };
    let envelope: Envelope<AuthData> = client.post("/auth/signup", &body).await?;

    match envelope.into_result() {
        Ok(auth) => {
            let name = auth.user.name.clone();
            session
                .login(auth.user, &auth.access_token, &auth.refresh_token)
                .await?;
            println!("Welcome, {}! Your account is ready.", name);
        }
        Err(message) => println!("Sign-up failed: {}", message),
    }
    Ok(())
}

async fn status(session: &Arc<SessionManager>) -> Result<()> {
    let authenticated = session.check_auth_status().await;
    if authenticated {
        let state = session.snapshot().await;
        if let Some(user) = state.user {
            println!("Signed in as {} <{}>", user.name, user.email);
        }
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

async fn whoami(client: &ApiClient, session: &Arc<SessionManager>) -> Result<()> {
    if !session.check_auth_status().await {
        println!("Not signed in.");
        return Ok(());
    }

    let envelope: Envelope<User> = client.get("/users/profile").await?;
    match envelope.into_result() {
        Ok(user) => print_profile(&user),
        Err(message) => println!("Could not load profile: {}", message),
    }
    Ok(())
}

fn print_profile(user: &User) {
    println!("{} <{}>", user.name, user.email);
    if let Some(ref bio) = user.bio {
        println!("  {}", bio);
    }
    if let Some(ref location) = user.location {
        println!("  {}", location);
    }
    if !user.youtube_links.is_empty() {
        println!("  shared videos:");
        for link in &user.youtube_links {
            println!("    {} - {}", link.title, link.url);
        }
    }
}

async fn feed(client: &ApiClient, session: &Arc<SessionManager>, page: u64) -> Result<()> {
    if !session.check_auth_status().await {
        println!("Not signed in.");
        return Ok(());
    }

    let endpoint = format!(
        "/users/content?page={}&limit={}&sortBy=newest",
        page, FEED_PAGE_SIZE
    );
    let envelope: Envelope<Vec<ContentItem>> = client.get(&endpoint).await?;
    let pagination = envelope.pagination.clone();

    match envelope.into_result() {
        Ok(items) => {
            if items.is_empty() {
                println!("Nothing here yet.");
            }
            for item in &items {
                let url = item.url.as_deref().unwrap_or("-");
                println!("{} - by {}", item.title, item.user.name);
                println!("    {}", url);
            }
        }
        Err(message) => println!("Could not load feed: {}", message),
    }

    if let Some(p) = pagination {
        println!("page {} of {} ({} items)", p.current_page, p.total_pages, p.total);
    }
    Ok(())
}

async fn signout(session: &Arc<SessionManager>) -> Result<()> {
    session.logout().await;
    println!("Signed out.");
    Ok(())
}

/// Read a line from stdin, falling back to the default when empty.
fn prompt(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(d) => print!("{} [{}]: ", label, d),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let value = line.trim();

    if value.is_empty() {
        if let Some(d) = default {
            return Ok(d.to_string());
        }
    }
    Ok(value.to_string())
}
