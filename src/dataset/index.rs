//! Dataset index
//!
//! Maps each author to the genuine and forged samples claiming their
//! signature, and derives the class list used for labeling:
//!
//! ```text
//! class_names = [<a>_genuine for a in authors] ++ [<a>_forged for a in authors]
//! ```
//!
//! Authors are kept in ascending id order. Within an author, samples keep the
//! (sorted) order in which the directory walk produced them.

use crate::dataset::classify::{FilenameClassifier, SignatureKind};
use crate::dataset::error::DatasetResult;
use crate::dataset::walker;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Samples claiming one author's signature
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorEntry {
    pub genuine: Vec<PathBuf>,
    pub forgeries: Vec<PathBuf>,
}

impl AuthorEntry {
    pub fn bucket(&self, kind: SignatureKind) -> &[PathBuf] {
        match kind {
            SignatureKind::Genuine => &self.genuine,
            SignatureKind::Forgery => &self.forgeries,
        }
    }

    fn push(&mut self, kind: SignatureKind, path: PathBuf) {
        match kind {
            SignatureKind::Genuine => self.genuine.push(path),
            SignatureKind::Forgery => self.forgeries.push(path),
        }
    }

    pub fn len(&self) -> usize {
        self.genuine.len() + self.forgeries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One labeled sample, as handed to a training pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    pub path: PathBuf,
    pub author: String,
    pub kind: SignatureKind,
    /// Position of the sample's class in [`DatasetIndex::class_names`]
    pub class_index: usize,
}

/// Genuine/forgery index over a SigComp training tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetIndex {
    train_dir: PathBuf,
    /// Recorded only; the test tree does not contribute to the index yet
    test_dir: PathBuf,
    extensions: Vec<String>,
    authors: BTreeMap<String, AuthorEntry>,
    built_at: DateTime<Utc>,
}

impl DatasetIndex {
    /// Walk `train_dir` and classify every matching file.
    ///
    /// Both roots must exist. A root without any matching file yields an
    /// empty index.
    pub fn build<S: AsRef<str>>(
        train_dir: impl AsRef<Path>,
        test_dir: impl AsRef<Path>,
        extensions: &[S],
    ) -> DatasetResult<Self> {
        let classifier = FilenameClassifier::new(extensions)?;
        let train_dir = resolve_root(train_dir.as_ref())?;
        let test_dir = resolve_root(test_dir.as_ref())?;

        let files = walker::find_files(&train_dir, classifier.extensions())?;
        let index = Self::from_files(train_dir, test_dir, &classifier, files);

        tracing::info!(
            train_dir = %index.train_dir.display(),
            authors = index.num_authors(),
            genuine = index.num_genuine(),
            forgeries = index.num_forgeries(),
            "Built dataset index"
        );

        Ok(index)
    }

    /// Build an index from an already collected file list, without touching the filesystem
    pub fn from_files(
        train_dir: PathBuf,
        test_dir: PathBuf,
        classifier: &FilenameClassifier,
        files: impl IntoIterator<Item = PathBuf>,
    ) -> Self {
        let mut authors: BTreeMap<String, AuthorEntry> = BTreeMap::new();
        let mut ignored = 0usize;

        for path in files {
            // Cached paths are serialized as UTF-8 strings
            if path.to_str().is_none() {
                tracing::warn!(path = %path.display(), "Skipping path that is not valid UTF-8");
                ignored += 1;
                continue;
            }

            match classifier.classify(&path) {
                Some(label) => authors.entry(label.signer).or_default().push(label.kind, path),
                None => {
                    tracing::trace!(path = %path.display(), "Ignoring unrecognized file name");
                    ignored += 1;
                }
            }
        }

        if ignored > 0 {
            tracing::debug!(ignored, "Files matched neither signature pattern");
        }

        Self {
            train_dir,
            test_dir,
            extensions: classifier.extensions().to_vec(),
            authors,
            built_at: Utc::now(),
        }
    }

    pub fn train_dir(&self) -> &Path {
        &self.train_dir
    }

    pub fn test_dir(&self) -> &Path {
        &self.test_dir
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Full author → samples mapping
    pub fn authors(&self) -> &BTreeMap<String, AuthorEntry> {
        &self.authors
    }

    pub fn author(&self, id: &str) -> Option<&AuthorEntry> {
        self.authors.get(id)
    }

    pub fn author_ids(&self) -> impl Iterator<Item = &str> {
        self.authors.keys().map(String::as_str)
    }

    pub fn num_authors(&self) -> usize {
        self.authors.len()
    }

    pub fn num_genuine(&self) -> usize {
        self.authors.values().map(|a| a.genuine.len()).sum()
    }

    pub fn num_forgeries(&self) -> usize {
        self.authors.values().map(|a| a.forgeries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    /// `<author>_genuine` for every author
    pub fn genuine_classes(&self) -> Vec<String> {
        self.classes(SignatureKind::Genuine)
    }

    /// `<author>_forged` for every author
    pub fn forged_classes(&self) -> Vec<String> {
        self.classes(SignatureKind::Forgery)
    }

    /// Genuine classes followed by forged classes
    pub fn class_names(&self) -> Vec<String> {
        let mut names = self.genuine_classes();
        names.extend(self.forged_classes());
        names
    }

    /// Always `2 * num_authors()`
    pub fn num_classes(&self) -> usize {
        2 * self.authors.len()
    }

    /// Position of `name` in [`class_names`](Self::class_names)
    pub fn class_index(&self, name: &str) -> Option<usize> {
        let (author, suffix) = name.rsplit_once('_')?;
        let kind = match suffix {
            "genuine" => SignatureKind::Genuine,
            "forged" => SignatureKind::Forgery,
            _ => return None,
        };
        let position = self.authors.keys().position(|id| id == author)?;
        Some(self.offset(kind) + position)
    }

    /// Every sample with its label, genuine samples before forgeries
    pub fn records(&self) -> Vec<SignatureRecord> {
        let mut records = Vec::with_capacity(self.num_genuine() + self.num_forgeries());

        for kind in [SignatureKind::Genuine, SignatureKind::Forgery] {
            for (position, (author, entry)) in self.authors.iter().enumerate() {
                for path in entry.bucket(kind) {
                    records.push(SignatureRecord {
                        path: path.clone(),
                        author: author.clone(),
                        kind,
                        class_index: self.offset(kind) + position,
                    });
                }
            }
        }

        records
    }

    pub fn summary(&self) -> IndexSummary {
        IndexSummary {
            train_dir: self.train_dir.clone(),
            test_dir: self.test_dir.clone(),
            authors: self.num_authors(),
            genuine: self.num_genuine(),
            forgeries: self.num_forgeries(),
            num_classes: self.num_classes(),
            built_at: self.built_at,
        }
    }

    fn classes(&self, kind: SignatureKind) -> Vec<String> {
        self.authors
            .keys()
            .map(|id| format!("{}_{}", id, kind.class_suffix()))
            .collect()
    }

    fn offset(&self, kind: SignatureKind) -> usize {
        match kind {
            SignatureKind::Genuine => 0,
            SignatureKind::Forgery => self.authors.len(),
        }
    }
}

/// Absolute form of an existing root directory
fn resolve_root(dir: &Path) -> DatasetResult<PathBuf> {
    walker::ensure_dir(dir)?;
    Ok(dir.canonicalize()?)
}

/// Aggregate counts for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    pub train_dir: PathBuf,
    pub test_dir: PathBuf,
    pub authors: usize,
    pub genuine: usize,
    pub forgeries: usize,
    pub num_classes: usize,
    pub built_at: DateTime<Utc>,
}

impl fmt::Display for IndexSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset Index:")?;
        writeln!(f, "  Train dir: {}", self.train_dir.display())?;
        writeln!(f, "  Test dir: {}", self.test_dir.display())?;
        writeln!(f, "  Authors: {}", self.authors)?;
        writeln!(f, "  Genuine samples: {}", self.genuine)?;
        writeln!(f, "  Forged samples: {}", self.forgeries)?;
        writeln!(f, "  Classes: {}", self.num_classes)?;
        write!(f, "  Built at: {}", self.built_at.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::error::DatasetError;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"png").unwrap();
    }

    fn layout(names: &[&str]) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("test")).unwrap();
        fs::create_dir_all(dir.path().join("train")).unwrap();
        for name in names {
            touch(&dir.path().join("train").join(name));
        }
        dir
    }

    fn file_names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_single_author_scenario() {
        let dir = layout(&["001_01.png", "001_02.png", "0002001_01.png"]);
        let index =
            DatasetIndex::build(dir.path().join("train"), dir.path().join("test"), &[".png"])
                .unwrap();

        let author = index.author("001").unwrap();
        assert_eq!(file_names(&author.genuine), vec!["001_01.png", "001_02.png"]);
        assert_eq!(file_names(&author.forgeries), vec!["0002001_01.png"]);

        assert_eq!(index.class_names(), vec!["001_genuine", "001_forged"]);
        assert_eq!(index.num_classes(), 2);
    }

    #[test]
    fn test_forgeries_never_land_in_genuine() {
        let dir = layout(&["0001002_03.png", "00010012_03.png"]);
        let index =
            DatasetIndex::build(dir.path().join("train"), dir.path().join("test"), &[".png"])
                .unwrap();

        let two = index.author("002").unwrap();
        assert!(two.genuine.is_empty());
        assert_eq!(file_names(&two.forgeries), vec!["0001002_03.png"]);

        let twelve = index.author("012").unwrap();
        assert!(twelve.genuine.is_empty());
        assert_eq!(file_names(&twelve.forgeries), vec!["00010012_03.png"]);

        assert_eq!(index.num_genuine(), 0);
    }

    #[test]
    fn test_multiple_authors_class_order() {
        let dir = layout(&[
            "002_01.png",
            "001_01.png",
            "0003002_01.png",
            "sub/0004001_02.png",
        ]);
        let index =
            DatasetIndex::build(dir.path().join("train"), dir.path().join("test"), &[".png"])
                .unwrap();

        assert_eq!(index.author_ids().collect::<Vec<_>>(), vec!["001", "002"]);
        assert_eq!(
            index.class_names(),
            vec!["001_genuine", "002_genuine", "001_forged", "002_forged"]
        );
        assert_eq!(index.num_classes(), 2 * index.num_authors());

        assert_eq!(index.class_index("001_genuine"), Some(0));
        assert_eq!(index.class_index("002_forged"), Some(3));
        assert_eq!(index.class_index("003_forged"), None);
        assert_eq!(index.class_index("001_other"), None);
    }

    #[test]
    fn test_ignores_unrecognized_files() {
        let dir = layout(&["001_01.png", "readme.png", "001_02.jpg", "notes.txt"]);
        let index =
            DatasetIndex::build(dir.path().join("train"), dir.path().join("test"), &[".png"])
                .unwrap();

        assert_eq!(index.num_authors(), 1);
        assert_eq!(index.num_genuine(), 1);
        assert_eq!(index.num_forgeries(), 0);
    }

    #[test]
    fn test_empty_index() {
        let dir = layout(&["readme.png"]);
        let index =
            DatasetIndex::build(dir.path().join("train"), dir.path().join("test"), &[".png"])
                .unwrap();

        assert!(index.is_empty());
        assert_eq!(index.num_classes(), 0);
        assert!(index.class_names().is_empty());
        assert!(index.records().is_empty());
    }

    #[test]
    fn test_test_dir_is_recorded_not_walked() {
        let dir = layout(&["001_01.png"]);
        touch(&dir.path().join("test").join("005_01.png"));

        let index =
            DatasetIndex::build(dir.path().join("train"), dir.path().join("test"), &[".png"])
                .unwrap();

        assert!(index.author("005").is_none());
        assert!(index.test_dir().ends_with("test"));
        assert!(index.test_dir().is_absolute());
        assert!(index.train_dir().is_absolute());
    }

    #[test]
    fn test_missing_roots() {
        let dir = layout(&[]);

        let err = DatasetIndex::build(dir.path().join("nope"), dir.path().join("test"), &[".png"])
            .unwrap_err();
        assert!(matches!(err, DatasetError::NotFound(_)));

        let err = DatasetIndex::build(dir.path().join("train"), dir.path().join("nope"), &[".png"])
            .unwrap_err();
        assert!(matches!(err, DatasetError::NotFound(_)));
    }

    #[test]
    fn test_records_carry_class_index() {
        let dir = layout(&["001_01.png", "002_01.png", "0009002_01.png"]);
        let index =
            DatasetIndex::build(dir.path().join("train"), dir.path().join("test"), &[".png"])
                .unwrap();

        let records = index.records();
        assert_eq!(records.len(), 3);

        let names = index.class_names();
        for record in &records {
            let expected = format!("{}_{}", record.author, record.kind.class_suffix());
            assert_eq!(names[record.class_index], expected);
        }

        let forged = records.last().unwrap();
        assert_eq!(forged.kind, SignatureKind::Forgery);
        assert_eq!(forged.class_index, 3);
    }

    #[test]
    fn test_from_files_without_filesystem() {
        let classifier = FilenameClassifier::new(&[".png"]).unwrap();
        let files = vec![
            PathBuf::from("/data/train/001_01.png"),
            PathBuf::from("/data/train/0002001_01.png"),
            PathBuf::from("/data/train/Thumbs.db"),
        ];

        let index = DatasetIndex::from_files(
            PathBuf::from("/data/train"),
            PathBuf::from("/data/test"),
            &classifier,
            files,
        );

        assert_eq!(index.num_authors(), 1);
        assert_eq!(index.author("001").unwrap().len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_from_files_skips_non_utf8_paths() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let classifier = FilenameClassifier::new(&[".png"]).unwrap();
        let odd = PathBuf::from("/data/train")
            .join(OsStr::from_bytes(b"writer_\xff"))
            .join("001_02.png");
        let files = vec![PathBuf::from("/data/train/001_01.png"), odd];

        let index = DatasetIndex::from_files(
            PathBuf::from("/data/train"),
            PathBuf::from("/data/test"),
            &classifier,
            files,
        );

        assert_eq!(index.num_genuine(), 1);
        assert_eq!(
            index.author("001").unwrap().genuine,
            vec![PathBuf::from("/data/train/001_01.png")]
        );
    }

    #[test]
    fn test_summary() {
        let dir = layout(&["001_01.png", "0002001_01.png"]);
        let index =
            DatasetIndex::build(dir.path().join("train"), dir.path().join("test"), &[".png"])
                .unwrap();

        let summary = index.summary();
        assert_eq!(summary.authors, 1);
        assert_eq!(summary.genuine, 1);
        assert_eq!(summary.forgeries, 1);
        assert_eq!(summary.num_classes, 2);
        assert!(summary.to_string().contains("Classes: 2"));
    }
}
