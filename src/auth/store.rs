use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::AuthError;
use super::token::Credentials;

const CREDENTIALS_FILE_NAME: &str = "credentials.toml";
const CREDENTIALS_FILE_VERSION: u32 = 1;

/// Storage abstraction for the cached Claudebin credentials.
///
/// A missing record is `Ok(None)`, not an error. Writers are not coordinated
/// across processes; the last save wins.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<Credentials>, AuthError>;
    fn save(&self, credentials: &Credentials) -> Result<(), AuthError>;
    fn clear(&self) -> Result<(), AuthError>;
}

/// File-backed credential store (`~/.claudebin/credentials.toml`).
///
/// # Example
/// ```no_run
/// use claudebin::auth::{CredentialStore, Credentials, FileCredentialStore};
///
/// let store = FileCredentialStore::new_default();
/// store.save(&Credentials {
///     access_token: "access".to_string(),
///     refresh_token: None,
///     expires_at: None,
///     user: None,
/// })?;
/// # Ok::<(), claudebin::auth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    base_dir: PathBuf,
}

impl FileCredentialStore {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn new_default() -> Self {
        Self::new(default_claudebin_dir())
    }

    pub fn path(&self) -> PathBuf {
        self.base_dir.join(CREDENTIALS_FILE_NAME)
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credentials>, AuthError> {
        let path = self.path();
        let raw = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        let file: CredentialsFile = toml::from_str(&raw)?;
        if file.version != CREDENTIALS_FILE_VERSION {
            return Err(AuthError::Serialization(format!(
                "Unsupported credentials file version {} at {}",
                file.version,
                path.display()
            )));
        }
        Ok(Some(file.credentials))
    }

    fn save(&self, credentials: &Credentials) -> Result<(), AuthError> {
        let file = CredentialsFile {
            version: CREDENTIALS_FILE_VERSION,
            saved_at: Utc::now(),
            credentials: credentials.clone(),
        };
        let serialized = toml::to_string(&file)?;
        atomic_write(&self.path(), serialized.as_bytes())
    }

    fn clear(&self) -> Result<(), AuthError> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Io(err.to_string())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CredentialsFile {
    version: u32,
    saved_at: DateTime<Utc>,
    credentials: Credentials,
}

/// Default per-user directory, `~/.claudebin`.
pub fn default_claudebin_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".claudebin"))
        .unwrap_or_else(|| PathBuf::from(".claudebin"))
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<(), AuthError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            // Only directories created here get 0700; existing ones keep their mode.
            let mut builder = fs::DirBuilder::new();
            builder.recursive(true);
            #[cfg(unix)]
            builder.mode(0o700);
            builder.create(parent)?;
        }
    }

    let file_name = path.file_name().ok_or_else(|| {
        AuthError::Io(format!("Credential path {} has no file name", path.display()))
    })?;

    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let temp_path = path.with_file_name(format!(
        ".{}.tmp-{}-{nonce}",
        file_name.to_string_lossy(),
        std::process::id()
    ));

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let write_result = (|| -> std::io::Result<()> {
        let mut temp_file = options.open(&temp_path)?;
        temp_file.write_all(data)?;
        temp_file.sync_all()?;
        Ok(())
    })();

    if let Err(err) = write_result {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }

    #[cfg(unix)]
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;

    Ok(())
}
