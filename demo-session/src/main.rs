use session_lifecycle::SessionScope;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(app_name: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        #[cfg(debug_assertions)]
        {
            format!("session_lifecycle=debug,{app_name}=debug,info").into()
        }

        #[cfg(not(debug_assertions))]
        {
            "info".into()
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("You can increase verbosity by setting the RUST_LOG environment variable.");
}

/// Walk one session through its lifecycle against the configured store
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing("demo_session");

    let user_id = std::env::args().nth(1).unwrap_or_else(|| "demo-user".to_string());
    let manager = session_lifecycle::init().await?;
    tracing::info!(config = ?manager.config(), "Session manager ready");

    // Login request
    let mut login = SessionScope::new();
    let session_id = manager.create(&mut login, &user_id).await?;
    println!("Created session for {user_id}");

    // A later request presenting the session cookie
    let mut request = SessionScope::new();
    match manager.validate(&mut request, session_id.as_str()).await? {
        Some(user) => println!("Session belongs to {user}"),
        None => println!("Session not found"),
    }
    if let Some(csrf) = manager.current_csrf_token(&request) {
        println!("CSRF token: {}", csrf.as_str());
        println!(
            "CSRF token accepted: {}",
            manager.verify_csrf_token(&request, csrf.as_str())
        );
    }
    request.settle().await;

    // Logout
    let removed = manager.remove(&mut request).await?;
    println!("Session removed: {removed}");

    let mut after = SessionScope::new();
    let found = manager.validate(&mut after, session_id.as_str()).await?;
    println!("Session still valid after logout: {}", found.is_some());

    Ok(())
}
