//! Convenience re-exports for common use.

pub use crate::api::{HttpApi, RemoteApi};
pub use crate::auth::{AuthService, Credentials, DeviceAuthFlow, FileCredentialStore};
pub use crate::config::ClaudebinConfig;
pub use crate::error::{ClaudebinError, Result};
pub use crate::publish::{Publication, PublishFlow, PublishRequest, Visibility};
pub use crate::session::SessionSource;
