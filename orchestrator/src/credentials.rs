use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;

/// Mode the kubeconfig is created with, before the process umask applies.
/// World-accessible.
pub const DEFAULT_CREDENTIAL_MODE: u32 = 0o777;

/// Where cluster kubeconfigs are written: `<dir>/.kubeconfig_<cluster>`
#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
    mode: u32,
}

impl CredentialStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            mode: DEFAULT_CREDENTIAL_MODE,
        }
    }

    /// Store rooted at the invoking user's home directory
    pub fn in_home() -> io::Result<Self> {
        dirs::home_dir().map(Self::new).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "cannot determine home directory")
        })
    }

    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    pub fn path_for(&self, cluster_name: &str) -> PathBuf {
        self.dir.join(format!(".kubeconfig_{}", cluster_name))
    }

    /// Write a kubeconfig, replacing any previous file for the same cluster
    pub fn write(&self, cluster_name: &str, kubeconfig: &str) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(cluster_name);
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(self.mode);
        }

        let mut file = options.open(&path)?;
        file.write_all(kubeconfig.as_bytes())?;
        file.flush()?;

        debug!("Wrote {} bytes of credentials to {:?}", kubeconfig.len(), path);
        Ok(path)
    }
}
