//! GitHub App credentials
//!
//! The private key is read fully into memory once and owned by the
//! credentials for the rest of the process. It never appears in `Debug`
//! output or logs.

use std::path::Path;

use tracing::{debug, warn};

use crate::{Error, Result};

/// Identity of a GitHub App installation
#[derive(Clone)]
pub struct AppCredentials {
    /// The GitHub App id
    pub app_id: u64,
    /// The installation of the App used for API calls
    pub installation_id: u64,
    private_key_pem: Vec<u8>,
}

impl AppCredentials {
    pub fn new(app_id: u64, installation_id: u64, private_key_pem: impl Into<Vec<u8>>) -> Self {
        Self {
            app_id,
            installation_id,
            private_key_pem: private_key_pem.into(),
        }
    }

    /// Load credentials, reading the PEM-encoded private key from `path`
    ///
    /// A key file readable by group or others is accepted with a warning.
    pub fn load(app_id: u64, installation_id: u64, path: &Path) -> Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let metadata = std::fs::metadata(path).map_err(Error::Io)?;
            let mode = metadata.permissions().mode();

            if mode & 0o077 != 0 {
                warn!(
                    path = %path.display(),
                    mode = format!("{:o}", mode & 0o777),
                    "Private key file is readable by other users; consider chmod 600"
                );
            }
        }

        let private_key_pem = std::fs::read(path).map_err(Error::Io)?;
        if private_key_pem.is_empty() {
            return Err(Error::Config(format!(
                "Private key file {} is empty",
                path.display()
            )));
        }

        debug!(path = %path.display(), bytes = private_key_pem.len(), "Loaded private key");

        Ok(Self::new(app_id, installation_id, private_key_pem))
    }

    /// The PEM-encoded private key
    pub fn private_key_pem(&self) -> &[u8] {
        &self.private_key_pem
    }
}

impl std::fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppCredentials")
            .field("app_id", &self.app_id)
            .field("installation_id", &self.installation_id)
            .finish_non_exhaustive()
    }
}
