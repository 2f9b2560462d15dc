use std::{fs::File, io, path::Path, time::Duration};

use derive_more::{Display, Error, From};
use reqwest::{blocking::Client, header::CONTENT_TYPE, StatusCode};

/// Bound on the whole HTTP exchange; a hung server must not block a
/// deployment forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Errors that make the HTTP exchange itself impossible.
#[derive(Debug, Display, From, Error)]
pub(crate) enum UploadError {
    /// Transport-level failure: connection refused, timeout, DNS failure.
    #[display(fmt = "HTTP error: {}", _0)]
    Http(reqwest::Error),

    /// The archive file could not be opened for reading.
    Io(io::Error),
}

/// Server verdict on an upload that completed at the transport level.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum UploadOutcome {
    /// The server answered `200 OK`; the trimmed response body is a
    /// success/progress message.
    Accepted(String),

    /// Any other status; the trimmed response body, or the status line text
    /// when the body is empty, describes the failure.
    Rejected(String),
}

/// POST the archive bytes to `base_url` + `deploy_key` and interpret the
/// response.
///
/// The key is concatenated onto the URL as-is; it is an opaque path segment
/// on the receiving service, never parsed or escaped. A single request is
/// made, with no retry.
pub(crate) fn upload(
    base_url: &str,
    deploy_key: &str,
    archive_path: &Path,
) -> Result<UploadOutcome, UploadError> {
    let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

    let response = client
        .post(format!("{base_url}{deploy_key}"))
        .header(CONTENT_TYPE, "application/octet-stream")
        .body(File::open(archive_path)?)
        .send()?;

    let status = response.status();
    let message = normalize(&response.text()?);

    if status == StatusCode::OK {
        Ok(UploadOutcome::Accepted(message))
    } else if message.is_empty() {
        Ok(UploadOutcome::Rejected(status.to_string()))
    } else {
        Ok(UploadOutcome::Rejected(message))
    }
}

/// Trim surrounding whitespace and normalize line endings of a response body.
fn normalize(raw: &str) -> String {
    raw.replace("\r\n", "\n").replace('\r', "\n").trim().to_string()
}

/// Prefix the message and each internal newline with two spaces, so
/// multi-line server responses print indented under the progress lines.
pub(crate) fn indent_lines(message: &str) -> String {
    format!("  {}", message.replace('\n', "\n  "))
}
