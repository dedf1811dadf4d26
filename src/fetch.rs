use std::fs;
use std::path::PathBuf;

use tracing::debug;

/// Where the fetched status document is spooled before decoding. The path
/// is shared by every invocation and overwritten on each run.
pub fn spool_path() -> PathBuf {
    std::env::temp_dir().join("comsys_ups_status.xml")
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("could not spool status document to {}: {}", .path.display(), .source)]
    Spool {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Retrieves `http://{host}/openxml.cgi` and spools the raw body before
/// returning it.
///
/// The request carries no timeout of its own; the scheduler's plugin
/// timeout is the backstop for a hanging device.
pub fn retrieve(host: &str) -> Result<String, FetchError> {
    let url = format!("http://{host}/openxml.cgi");
    debug!(url = %url, "requesting status document");

    let response = reqwest::blocking::get(&url).map_err(|source| FetchError::Transport {
        url: url.clone(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status { url, status });
    }

    let body = response
        .text()
        .map_err(|source| FetchError::Transport { url, source })?;

    let path = spool_path();
    fs::write(&path, &body).map_err(|source| FetchError::Spool {
        path: path.clone(),
        source,
    })?;
    debug!(bytes = body.len(), spool = %path.display(), "status document spooled");

    Ok(body)
}
