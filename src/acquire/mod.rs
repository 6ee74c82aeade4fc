//! Dataset acquisition
//!
//! Makes sure the train and test archives are present locally:
//!
//! ```text
//! archive present? ── yes ──→ done
//!        │ no
//!        ↓
//! GET url → <archive>.part → extract into split dir → rename to <archive>
//! ```
//!
//! The archive is only moved into place after a successful extraction, so
//! its presence means the split directory was populated. Failures are
//! fatal and not retried.

pub mod download;
pub mod error;
pub mod extract;

pub use download::{build_client, download_file};
pub use error::{AcquireError, AcquireResult};
pub use extract::extract_archive;

use crate::config::{AcquisitionConfig, ArchiveConfig, DatasetConfig};
use reqwest::blocking::Client;
use std::fs;
use std::path::PathBuf;

/// A remote archive resolved against the dataset layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSource {
    pub url: String,
    /// Where the downloaded archive is kept
    pub archive_path: PathBuf,
    /// Where its contents are extracted
    pub extract_dir: PathBuf,
    pub password: Option<String>,
}

impl ArchiveSource {
    /// Resolve an archive entry: it is stored in the dataset root under its URL file name
    pub fn resolve(archive: &ArchiveConfig, dataset: &DatasetConfig) -> AcquireResult<Self> {
        let file_name = archive_file_name(&archive.url)?;

        Ok(Self {
            url: archive.url.clone(),
            archive_path: dataset.root().join(file_name),
            extract_dir: dataset.split_dir(archive.split),
            password: archive.password.clone(),
        })
    }
}

/// Last path segment of an archive URL
fn archive_file_name(url: &str) -> AcquireResult<String> {
    let parsed =
        reqwest::Url::parse(url).map_err(|e| AcquireError::InvalidUrl(format!("{}: {}", url, e)))?;

    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AcquireError::InvalidUrl(url.to_string()))
}

/// Download and extract every configured archive that is not present yet.
///
/// Returns the archives that were fetched during this call.
pub fn ensure_data_available(
    acquisition: &AcquisitionConfig,
    dataset: &DatasetConfig,
) -> AcquireResult<Vec<PathBuf>> {
    let sources = acquisition
        .archives
        .iter()
        .map(|archive| ArchiveSource::resolve(archive, dataset))
        .collect::<AcquireResult<Vec<_>>>()?;

    let client = build_client(acquisition)?;

    let mut fetched = Vec::new();
    for source in &sources {
        if maybe_download_and_extract(&client, source)? {
            fetched.push(source.archive_path.clone());
        }
    }

    Ok(fetched)
}

/// Fetch and unpack one archive unless it is already present. Returns whether work was done.
pub fn maybe_download_and_extract(client: &Client, source: &ArchiveSource) -> AcquireResult<bool> {
    if source.archive_path.exists() {
        tracing::debug!(
            archive = %source.archive_path.display(),
            "Archive already present, skipping"
        );
        return Ok(false);
    }

    let mut part_name = source
        .archive_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    part_name.push(".part");
    let part_path = source.archive_path.with_file_name(part_name);

    download_file(client, &source.url, &part_path)?;

    if let Err(e) = extract_archive(&part_path, &source.extract_dir, source.password.as_deref()) {
        let _ = fs::remove_file(&part_path);
        return Err(e);
    }

    fs::rename(&part_path, &source.archive_path)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Split;
    use std::io::{BufRead, BufReader, Cursor, Write};
    use std::net::TcpListener;
    use std::path::Path;
    use std::thread;
    use tempfile::tempdir;
    use zip::unstable::write::FileOptionsExt;
    use zip::write::SimpleFileOptions;

    const PASSWORD: &str = "I hereby accept the SigComp 2011 disclaimer.";

    fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().with_deprecated_encryption(PASSWORD.as_bytes());
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    /// Serve a single HTTP response, returning the base URL
    fn serve_once(status: &'static str, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            loop {
                line.clear();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
            }

            let mut stream = stream;
            let header = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nContent-Type: application/zip\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            );
            stream.write_all(header.as_bytes()).unwrap();
            stream.write_all(&body).unwrap();
            stream.flush().unwrap();
        });

        format!("http://{}", addr)
    }

    fn local_client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    fn source(root: &Path, url: String) -> ArchiveSource {
        ArchiveSource {
            url,
            archive_path: root.join("sigComp2011-trainingSet.zip"),
            extract_dir: root.join("train"),
            password: Some(PASSWORD.to_string()),
        }
    }

    #[test]
    fn test_resolve_archive_source() {
        let dataset = DatasetConfig {
            root: "/data/sigComp2011".to_string(),
            ..DatasetConfig::default()
        };
        let archive = ArchiveConfig {
            split: Split::Test,
            url: "http://example.com/files/sigComp2011-test.zip?x=1".to_string(),
            password: None,
        };

        let source = ArchiveSource::resolve(&archive, &dataset).unwrap();
        assert_eq!(
            source.archive_path,
            PathBuf::from("/data/sigComp2011/sigComp2011-test.zip")
        );
        assert_eq!(source.extract_dir, PathBuf::from("/data/sigComp2011/test"));
    }

    #[test]
    fn test_invalid_urls() {
        assert!(matches!(
            archive_file_name("not a url"),
            Err(AcquireError::InvalidUrl(_))
        ));
        assert!(matches!(
            archive_file_name("http://example.com/"),
            Err(AcquireError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_download_and_extract() {
        let dir = tempdir().unwrap();
        let body = zip_bytes(&[
            ("001_01.png", b"genuine"),
            ("0002001_01.png", b"forged"),
        ]);
        let base = serve_once("200 OK", body);
        let source = source(dir.path(), format!("{}/sigComp2011-trainingSet.zip", base));

        let fetched = maybe_download_and_extract(&local_client(), &source).unwrap();

        assert!(fetched);
        assert!(source.archive_path.exists());
        assert!(!dir.path().join("sigComp2011-trainingSet.zip.part").exists());
        assert_eq!(fs::read(dir.path().join("train").join("001_01.png")).unwrap(), b"genuine");
        assert!(dir.path().join("train").join("0002001_01.png").exists());
    }

    #[test]
    fn test_existing_archive_is_not_downloaded() {
        let dir = tempdir().unwrap();
        // Nothing listens here; any request would fail
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/sigComp2011-trainingSet.zip", listener.local_addr().unwrap());
        drop(listener);

        let source = source(dir.path(), url);
        fs::write(&source.archive_path, b"already here").unwrap();

        let fetched = maybe_download_and_extract(&local_client(), &source).unwrap();
        assert!(!fetched);
    }

    #[test]
    fn test_http_error_is_fatal() {
        let dir = tempdir().unwrap();
        let base = serve_once("404 Not Found", Vec::new());
        let source = source(dir.path(), format!("{}/sigComp2011-trainingSet.zip", base));

        let err = maybe_download_and_extract(&local_client(), &source).unwrap_err();

        assert!(matches!(err, AcquireError::Http(_)));
        assert!(!source.archive_path.exists());
        assert!(!dir.path().join("sigComp2011-trainingSet.zip.part").exists());
    }

    #[test]
    fn test_bad_archive_is_not_kept() {
        let dir = tempdir().unwrap();
        let base = serve_once("200 OK", b"this is not a zip".to_vec());
        let source = source(dir.path(), format!("{}/sigComp2011-trainingSet.zip", base));

        let err = maybe_download_and_extract(&local_client(), &source).unwrap_err();

        assert!(matches!(err, AcquireError::Archive(_)));
        assert!(!source.archive_path.exists());
        assert!(!dir.path().join("sigComp2011-trainingSet.zip.part").exists());
    }
}
