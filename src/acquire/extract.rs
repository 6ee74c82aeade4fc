//! ZIP extraction

use crate::acquire::error::AcquireResult;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;

/// Extract every entry of `archive` below `target`, returning the number of files written.
///
/// Entries whose names would escape `target` are skipped. With a password,
/// encrypted entries are decrypted; a wrong password fails the extraction.
pub fn extract_archive(archive: &Path, target: &Path, password: Option<&str>) -> AcquireResult<usize> {
    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(BufReader::new(file))?;

    fs::create_dir_all(target)?;

    let mut extracted = 0usize;

    for i in 0..zip.len() {
        let mut entry = match password {
            Some(password) => zip.by_index_decrypt(i, password.as_bytes())?,
            None => zip.by_index(i)?,
        };

        let Some(relative) = entry.enclosed_name() else {
            tracing::warn!(name = %entry.name(), "Skipping archive entry outside target directory");
            continue;
        };
        let out_path = target.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut out = File::create(&out_path)?;
        io::copy(&mut entry, &mut out)?;
        extracted += 1;
    }

    tracing::info!(
        archive = %archive.display(),
        target = %target.display(),
        files = extracted,
        "Extracted archive"
    );

    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::tempdir;
    use zip::unstable::write::FileOptionsExt;
    use zip::write::SimpleFileOptions;

    const PASSWORD: &str = "I hereby accept the SigComp 2011 disclaimer.";

    fn write_zip(path: &Path, password: Option<&str>, entries: &[(&str, &[u8])]) {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = match password {
            Some(pw) => SimpleFileOptions::default().with_deprecated_encryption(pw.as_bytes()),
            None => SimpleFileOptions::default(),
        };

        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }

        let bytes = writer.finish().unwrap().into_inner();
        fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_extract_plain_archive() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("plain.zip");
        write_zip(
            &archive,
            None,
            &[
                ("001_01.png", b"genuine"),
                ("forgeries/0002001_01.png", b"forged"),
            ],
        );

        let target = dir.path().join("train");
        let count = extract_archive(&archive, &target, None).unwrap();

        assert_eq!(count, 2);
        assert_eq!(fs::read(target.join("001_01.png")).unwrap(), b"genuine");
        assert_eq!(
            fs::read(target.join("forgeries").join("0002001_01.png")).unwrap(),
            b"forged"
        );
    }

    #[test]
    fn test_extract_encrypted_archive() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("secret.zip");
        write_zip(&archive, Some(PASSWORD), &[("001_01.png", b"genuine signature")]);

        let target = dir.path().join("train");
        let count = extract_archive(&archive, &target, Some(PASSWORD)).unwrap();

        assert_eq!(count, 1);
        assert_eq!(fs::read(target.join("001_01.png")).unwrap(), b"genuine signature");
    }

    #[test]
    fn test_wrong_password_fails() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("secret.zip");
        write_zip(&archive, Some(PASSWORD), &[("001_01.png", b"genuine signature")]);

        let result = extract_archive(&archive, &dir.path().join("train"), Some("not it"));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_password_fails() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("secret.zip");
        write_zip(&archive, Some(PASSWORD), &[("001_01.png", b"genuine signature")]);

        let result = extract_archive(&archive, &dir.path().join("train"), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_corrupt_archive_fails() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("broken.zip");
        fs::write(&archive, b"not a zip file").unwrap();

        let err = extract_archive(&archive, &dir.path().join("train"), None).unwrap_err();
        assert!(matches!(err, crate::acquire::AcquireError::Archive(_)));
    }
}
