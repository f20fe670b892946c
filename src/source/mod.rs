use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::debug;

/// Command sent to the balancer's control socket.
const SHOW_STAT: &[u8] = b"show stat\n";

/// Provides one complete statistics snapshot per call.
///
/// `fetch` blocks; the agent runs it on a blocking worker. Implementations
/// must return the whole snapshot text or fail, never a partial read.
pub trait SnapshotSource: Send + Sync {
    fn fetch(&self) -> Result<String>;
}

/// Fetches snapshots from the HAProxy stats socket.
pub struct UnixSocketSource {
    path: PathBuf,
    timeout: Duration,
}

impl UnixSocketSource {
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotSource for UnixSocketSource {
    fn fetch(&self) -> Result<String> {
        let mut stream = UnixStream::connect(&self.path)
            .with_context(|| format!("connecting to stats socket {}", self.path.display()))?;

        stream
            .set_read_timeout(Some(self.timeout))
            .context("setting read timeout")?;
        stream
            .set_write_timeout(Some(self.timeout))
            .context("setting write timeout")?;

        stream
            .write_all(SHOW_STAT)
            .context("writing show stat command")?;

        // The balancer closes its side after dumping the table.
        let mut text = String::new();
        stream
            .read_to_string(&mut text)
            .with_context(|| format!("reading snapshot from {}", self.path.display()))?;

        if text.trim().is_empty() {
            bail!(
                "stats socket {} returned an empty snapshot",
                self.path.display()
            );
        }

        debug!(bytes = text.len(), "fetched stats snapshot");

        Ok(text)
    }
}
