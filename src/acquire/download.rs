//! Archive download over plain HTTP(S) GET

use crate::acquire::error::AcquireResult;
use crate::config::AcquisitionConfig;
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::path::Path;
use std::time::Duration;

/// Build the blocking HTTP client used for all downloads
pub fn build_client(config: &AcquisitionConfig) -> AcquireResult<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(client)
}

/// Download `url` into `dest`, returning the number of bytes written.
///
/// Any non-success status is an error. There is no retry; a failed
/// download removes the partial file.
pub fn download_file(client: &Client, url: &str, dest: &Path) -> AcquireResult<u64> {
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    tracing::info!(url = %url, dest = %dest.display(), "Downloading archive");

    let result = fetch_into(client, url, dest);
    if result.is_err() {
        let _ = fs::remove_file(dest);
    }

    let bytes = result?;
    tracing::info!(url = %url, bytes, "Download complete");
    Ok(bytes)
}

fn fetch_into(client: &Client, url: &str, dest: &Path) -> AcquireResult<u64> {
    let mut response = client.get(url).send()?.error_for_status()?;

    if let Some(len) = response.content_length() {
        tracing::debug!(url = %url, content_length = len, "Response received");
    }

    let mut file = File::create(dest)?;
    let bytes = response.copy_to(&mut file)?;
    file.sync_all()?;

    Ok(bytes)
}
