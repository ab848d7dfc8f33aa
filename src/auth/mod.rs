//! Device authorization, token lifecycle, and credential storage.

pub mod device_code;
pub mod error;
pub mod service;
pub mod store;
pub mod token;

pub use device_code::DeviceAuthFlow;
pub use error::AuthError;
pub use service::{AuthService, AuthStatus};
pub use store::{CredentialStore, FileCredentialStore};
pub use token::{now_millis, Credentials, UserProfile};
