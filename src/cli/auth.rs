//! CLI auth command handlers for login, status, and logout.

use crate::auth::{AuthService, AuthStatus};
use crate::config::ClaudebinConfig;

/// Handle `claudebin auth login`.
pub async fn handle_login(config: &ClaudebinConfig) -> Result<(), Box<dyn std::error::Error>> {
    let auth = AuthService::from_config(config);
    let flow = auth.device_flow();

    let start = flow.start().await?;
    println!("🔗 Visit: {}", start.url);
    println!("⏳ Waiting for authorization...");

    let credentials = flow.authorize(&start).await?;
    match credentials.user.as_ref().and_then(|u| u.name.as_deref()) {
        Some(name) => println!("✅ Logged in as {name}"),
        None => println!("✅ Login successful!"),
    }
    Ok(())
}

/// Handle `claudebin auth status`.
pub async fn handle_status(config: &ClaudebinConfig) -> Result<(), Box<dyn std::error::Error>> {
    let auth = AuthService::from_config(config);

    match auth.status()? {
        AuthStatus::LoggedOut => println!("❌ Not logged in"),
        AuthStatus::LoggedIn {
            user,
            expires_at,
            fresh,
        } => {
            let who = user
                .as_ref()
                .map(|u| {
                    u.name
                        .clone()
                        .or_else(|| u.email.clone())
                        .unwrap_or_else(|| u.id.clone())
                })
                .unwrap_or_else(|| "unknown user".to_string());
            let expiry = match expires_at {
                Some(at) if fresh => format!("expires {}", at.format("%Y-%m-%d %H:%M")),
                Some(_) => "token expiring (will refresh on next use)".to_string(),
                None => "no expiry recorded (will refresh on next use)".to_string(),
            };
            println!("✅ Logged in as {who} ({expiry})");
        }
    }
    Ok(())
}

/// Handle `claudebin auth logout`.
pub async fn handle_logout(config: &ClaudebinConfig) -> Result<(), Box<dyn std::error::Error>> {
    AuthService::from_config(config).logout()?;
    println!("✅ Logged out");
    Ok(())
}
