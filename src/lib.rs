//! Claudebin client
//!
//! Signs in to Claudebin with a device authorization flow, caches and renews
//! the resulting credentials, and publishes Claude Code session transcripts,
//! waiting for server-side processing to produce a shareable link.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use claudebin::prelude::*;
//!
//! # async fn example() -> claudebin::error::Result<()> {
//! let config = ClaudebinConfig::from_env();
//! let auth = AuthService::from_config(&config);
//! let flow = PublishFlow::new(Arc::new(HttpApi::from_config(&config)), &config);
//!
//! let payload = SessionSource::new_default().extract("/path/to/project")?;
//! let request = PublishRequest::builder().payload(payload).build();
//! let publication = flow.share(&auth, &request).await?;
//! println!("{}", publication.url);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod prelude;
pub mod publish;
pub mod session;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
