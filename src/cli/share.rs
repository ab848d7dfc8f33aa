//! CLI handlers for extracting and publishing sessions.

use std::sync::Arc;

use crate::api::HttpApi;
use crate::auth::AuthService;
use crate::config::ClaudebinConfig;
use crate::error::ClaudebinError;
use crate::publish::{Publication, PublishFlow, PublishRequest, Visibility};
use crate::session::SessionSource;

use super::{PublishArgs, ShareArgs};

/// Handle `claudebin extract <project_path>`.
pub async fn handle_extract(project_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let transcript = SessionSource::new_default().extract(project_path)?;
    print!("{transcript}");
    Ok(())
}

/// Handle `claudebin share <project_path>`.
pub async fn handle_share(
    config: &ClaudebinConfig,
    args: ShareArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = build_request(&args.project_path, args.title, args.unlisted)?;

    let config = config.clone().with_open_browser(config.open_browser && !args.no_browser);
    let auth = AuthService::from_config(&config);
    let flow = PublishFlow::new(Arc::new(HttpApi::from_config(&config)), &config);

    eprintln!("⏳ Publishing session...");
    report(flow.share(&auth, &request).await)
}

/// Handle `claudebin publish <project_path>`.
pub async fn handle_publish(
    config: &ClaudebinConfig,
    args: PublishArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = build_request(&args.project_path, args.title, args.unlisted)?;

    let config = config.clone().with_open_browser(false);
    let auth = AuthService::from_config(&config);
    let flow = PublishFlow::new(Arc::new(HttpApi::from_config(&config)), &config);

    eprintln!("⏳ Publishing session...");
    report(flow.publish_cached(&auth, &request).await)
}

fn build_request(
    project_path: &str,
    title: Option<String>,
    unlisted: bool,
) -> Result<PublishRequest, ClaudebinError> {
    let payload = SessionSource::new_default().extract(project_path)?;
    let visibility = if unlisted {
        Visibility::Unlisted
    } else {
        Visibility::Public
    };
    Ok(PublishRequest::builder()
        .payload(payload)
        .maybe_title(title)
        .visibility(visibility)
        .build())
}

fn report(
    outcome: Result<Publication, ClaudebinError>,
) -> Result<(), Box<dyn std::error::Error>> {
    match outcome {
        Ok(publication) => {
            println!("{}", publication.url);
            Ok(())
        }
        Err(e) => {
            if let Some(id) = e.submission_id() {
                eprintln!("Submission id: {id}");
            }
            Err(e.into())
        }
    }
}
