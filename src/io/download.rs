//! HTTP fetching of published sheets.

use std::{fs::File, io::{Read, Write}, path::{Path, PathBuf}, time::Duration};

use anyhow::{bail, Context, Result};
use reqwest::{blocking::Client, redirect::Policy};
use tempfile::NamedTempFile;

/// Write-then-rename wrapper for atomic file outputs
struct PendingWrite {
    target: PathBuf,
    tmp: NamedTempFile,
}

impl PendingWrite {
    /// Open a file for writing, refusing to clobber an existing one unless `force`.
    fn open(target: &Path, force: bool) -> Result<Self> {
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("[io::download] create dir {}", parent.display()))?;
        }
        if !force && target.exists() {
            bail!("[io::download] Refusing to overwrite existing file: {} (use --force)", target.display());
        }
        let dir = target.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let tmp = NamedTempFile::new_in(dir).context("[io::download] create temp file")?;

        Ok(Self { target: target.to_path_buf(), tmp })
    }

    /// Finalize the write.
    fn finalize(self) -> Result<()> {
        self.tmp.as_file().sync_all().ok(); // best-effort fsync file
        self.tmp.persist(&self.target)
            .with_context(|| format!("[io::download] rename to {}", self.target.display()))?;
        if let Some(dir) = self.target.parent() {
            let _ = File::open(dir).and_then(|f| f.sync_all());
        }
        Ok(())
    }
}

impl Write for PendingWrite {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> { self.tmp.write(buf) }

    fn flush(&mut self) -> std::io::Result<()> { self.tmp.flush() }
}

fn client() -> Result<Client> {
    Ok(Client::builder()
        .user_agent(concat!("votemap/", env!("CARGO_PKG_VERSION")))
        .redirect(Policy::limited(10))
        .timeout(Duration::from_secs(60))
        .build()?)
}

/// Fetch the body of `url` into memory.
pub(crate) fn fetch_bytes(url: &str) -> Result<Vec<u8>> {
    let mut resp = client()?
        .get(url)
        .send()
        .with_context(|| format!("[io::download] GET {url}"))?
        .error_for_status()
        .with_context(|| format!("[io::download] GET {url} returned error status"))?;

    let mut body = Vec::new();
    resp.read_to_end(&mut body)
        .with_context(|| format!("[io::download] read body of {url}"))?;
    Ok(body)
}

/// Download `url` to `out_path` through a temp file and atomic rename.
pub(crate) fn download_file(url: &str, out_path: &Path, force: bool) -> Result<()> {
    let mut sink = PendingWrite::open(out_path, force)?;

    let mut resp = client()?
        .get(url)
        .send()
        .with_context(|| format!("[io::download] GET {url}"))?
        .error_for_status()
        .with_context(|| format!("[io::download] GET {url} returned error status"))?;

    std::io::copy(&mut resp, &mut sink)
        .with_context(|| format!("[io::download] write {}", out_path.display()))?;

    sink.finalize()
}
