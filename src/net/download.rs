//! Installer binary downloads.
//!
//! Fetches vendor installer packages over HTTP(S) and streams them to a
//! local file. Downloads are the only network activity in the tool.

use crate::error::{Result, SetupError};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

/// Downloads installer binaries with a request timeout.
///
/// # Example
///
/// ```no_run
/// use basecamp::net::Downloader;
/// use std::path::Path;
/// use std::time::Duration;
///
/// let downloader = Downloader::new(Duration::from_secs(300));
/// downloader.download("https://example.com/node.msi", Path::new("./node.msi")).unwrap();
/// ```
pub struct Downloader {
    /// HTTP client.
    client: reqwest::blocking::Client,
    /// Show a progress bar while downloading.
    show_progress: bool,
}

impl Downloader {
    /// Create a downloader with the specified timeout.
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            show_progress: false,
        }
    }

    /// Enable or disable the download progress bar.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Download `url` to `dest`, replacing any existing file.
    ///
    /// Non-2xx responses are errors; a partially written file is removed
    /// before returning the error.
    pub fn download(&self, url: &str, dest: &Path) -> Result<()> {
        tracing::debug!("Downloading {} -> {}", url, dest.display());

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| SetupError::DownloadFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(SetupError::DownloadFailed {
                url: url.to_string(),
                message: format!("HTTP {}", response.status()),
            });
        }

        let total = response.content_length();
        let bar = self.progress_bar(total, dest);

        let result = self.stream_to_file(response, dest, &bar);
        bar.finish_and_clear();

        if result.is_err() {
            let _ = std::fs::remove_file(dest);
        }
        result.map_err(|e| SetupError::DownloadFailed {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    fn stream_to_file(
        &self,
        mut response: reqwest::blocking::Response,
        dest: &Path,
        bar: &ProgressBar,
    ) -> std::io::Result<()> {
        let mut file = File::create(dest)?;
        let mut buf = [0u8; 64 * 1024];
        loop {
            let n = response
                .read(&mut buf)
                .map_err(|e| std::io::Error::other(e.to_string()))?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n])?;
            bar.inc(n as u64);
        }
        file.flush()
    }

    fn progress_bar(&self, total: Option<u64>, dest: &Path) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = match total {
            Some(len) => {
                let bar = ProgressBar::new(len);
                bar.set_style(
                    ProgressStyle::with_template(
                        "{msg} [{bar:30}] {bytes}/{total_bytes} ({eta})",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
                );
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                bar.enable_steady_tick(Duration::from_millis(100));
                bar
            }
        };
        bar.set_message(
            dest.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
        );
        bar
    }
}
