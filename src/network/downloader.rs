//! Blocking file downloader with progress reporting.

use std::io::Read;

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;

/// Error type for [downloader](self) operations.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// The HTTP request failed or returned a non-success status.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Reading the response body failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Downloads the file at the given url and returns its bytes.
///
/// Download progress is reported with a [progress bar](indicatif) labeled
/// with `message`, sized from the `Content-Length` header when the server
/// provides one.
pub fn download_file_as_bytes(url: &str, message: &str) -> Result<Vec<u8>, DownloadError> {
    let response = reqwest::blocking::get(url)?.error_for_status()?;

    let progress = match response.content_length() {
        Some(length) => ProgressBar::new(length),
        None => ProgressBar::new_spinner(),
    };
    progress.set_style(
        ProgressStyle::with_template(
            "{msg} [{elapsed_precise}] [{wide_bar}] {bytes}/{total_bytes}",
        )
        .expect("static progress template is valid")
        .progress_chars("=> "),
    );
    progress.set_message(message.to_string());

    let mut bytes = Vec::new();
    progress.wrap_read(response).read_to_end(&mut bytes)?;
    progress.finish();

    Ok(bytes)
}
