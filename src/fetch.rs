//! Fetch a URL into a local directory.
//!
//! `http(s)://` goes through a blocking reqwest client; `file://` URLs are
//! copied, which is handy for local mirrors. The download is streamed into a
//! temporary file next to the destination and renamed into place, so an
//! interrupted fetch never leaves a truncated archive under the final name.

use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{IoContext, Result, ToolchainError};

const USER_AGENT: &str = concat!("mayflower/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// A fetched file and the sha256 of its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub path: PathBuf,
    pub sha256: String,
}

/// File name a URL is saved under: the last non-empty path segment, without
/// query string or fragment.
pub fn archive_name_from_url(url: &str) -> Result<String> {
    let without_suffix = url.split(['?', '#']).next().unwrap_or(url);
    let path = without_suffix
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(without_suffix);
    let name = path.rsplit('/').find(|segment| !segment.is_empty());

    match name {
        // A bare host ("https://example.com") has no file segment.
        Some(name) if path.contains('/') && name != ".." && name != "." => Ok(name.to_string()),
        _ => Err(ToolchainError::ArchiveName(url.to_string())),
    }
}

/// Download `url` into `dest_dir`, returning the local archive path.
pub fn download_url(url: &str, dest_dir: &Path) -> Result<Fetched> {
    let name = archive_name_from_url(url)?;
    let dest = dest_dir.join(&name);
    let tmp = dest_dir.join(format!(".{name}.part"));

    let result = if let Some(local) = url.strip_prefix("file://") {
        copy_local(Path::new(local), &tmp)
    } else {
        download_http(url, &tmp)
    };

    let sha256 = match result {
        Ok(sha256) => sha256,
        Err(err) => {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }
    };

    fs::rename(&tmp, &dest).io_context(|| {
        format!(
            "moving downloaded archive '{}' to '{}'",
            tmp.display(),
            dest.display()
        )
    })?;
    log::debug!("fetched {} -> {} (sha256 {})", url, dest.display(), sha256);
    Ok(Fetched { path: dest, sha256 })
}

fn download_http(url: &str, tmp: &Path) -> Result<String> {
    let download_err = |source: reqwest::Error| ToolchainError::Download {
        url: url.to_string(),
        source: Box::new(source),
    };

    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT)
        // Toolchain archives are large; only the connect step is bounded.
        .timeout(None)
        .build()
        .map_err(download_err)?;

    let response = client.get(url).send().map_err(download_err)?;
    let status = response.status();
    if !status.is_success() {
        return Err(ToolchainError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    stream_to_file(response, tmp).map_err(|source| ToolchainError::Download {
        url: url.to_string(),
        source: Box::new(source),
    })
}

fn copy_local(src: &Path, tmp: &Path) -> Result<String> {
    let file =
        File::open(src).io_context(|| format!("opening local archive '{}'", src.display()))?;
    stream_to_file(file, tmp).io_context(|| format!("copying '{}'", src.display()))
}

/// Copy `reader` into `dest`, hashing as it goes.
fn stream_to_file<R: Read>(mut reader: R, dest: &Path) -> io::Result<String> {
    let mut out = File::create(dest)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 1024 * 1024];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
        out.write_all(&buf[..n])?;
    }
    out.sync_all()?;
    Ok(format!("{:x}", hasher.finalize()))
}
