//! Filename classification
//!
//! SigComp file names encode who wrote a sample and whose signature it
//! claims to be:
//!
//! ```text
//! forgery:  <forger:4><signer:3>_<sample:2>.<ext>    e.g. 0002001_01.png
//! genuine:  <signer:3>_<sample:2>.<ext>              e.g. 001_01.png
//! ```
//!
//! Both patterns are anchored at the end of the base name only, so any
//! prefix is tolerated. The genuine pattern matches the tail of every
//! forgery name, which is why the forgery pattern must be tried first.

use crate::dataset::error::{DatasetError, DatasetResult};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Which bucket a signature sample belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureKind {
    Genuine,
    Forgery,
}

impl SignatureKind {
    /// Suffix used in class names (`001_genuine`, `001_forged`)
    pub fn class_suffix(&self) -> &'static str {
        match self {
            SignatureKind::Genuine => "genuine",
            SignatureKind::Forgery => "forged",
        }
    }
}

impl fmt::Display for SignatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureKind::Genuine => write!(f, "genuine"),
            SignatureKind::Forgery => write!(f, "forgery"),
        }
    }
}

/// Labels recovered from a file name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub kind: SignatureKind,
    /// Author whose signature is claimed
    pub signer: String,
    /// Author who produced the sample, known only for forgeries
    pub forger: Option<String>,
    /// Two-digit sample index
    pub sample: String,
}

/// Classifies file names into genuine or forged signatures
#[derive(Debug, Clone)]
pub struct FilenameClassifier {
    forgery: Regex,
    genuine: Regex,
    extensions: Vec<String>,
}

impl FilenameClassifier {
    /// Build a classifier recognizing the given extensions (case-insensitive)
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> DatasetResult<Self> {
        let extensions = normalize_extensions(extensions)?;

        let alternatives = extensions
            .iter()
            .map(|ext| regex::escape(ext))
            .collect::<Vec<_>>()
            .join("|");

        let forgery = Regex::new(&format!(
            r"(?i)(?P<forger>[0-9]{{4}})(?P<signer>[0-9]{{3}})_(?P<sample>[0-9]{{2}})(?:{})$",
            alternatives
        ))?;
        let genuine = Regex::new(&format!(
            r"(?i)(?P<signer>[0-9]{{3}})_(?P<sample>[0-9]{{2}})(?:{})$",
            alternatives
        ))?;

        Ok(Self {
            forgery,
            genuine,
            extensions,
        })
    }

    /// Recognized extensions, lowercased
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Classify a path by its base name
    pub fn classify(&self, path: &Path) -> Option<Classification> {
        let name = path.file_name()?.to_str()?;
        self.classify_name(name)
    }

    /// Classify a bare file name. Returns `None` for names matching neither pattern.
    pub fn classify_name(&self, name: &str) -> Option<Classification> {
        if let Some(caps) = self.forgery.captures(name) {
            return Some(Classification {
                kind: SignatureKind::Forgery,
                signer: group(&caps, "signer"),
                forger: Some(group(&caps, "forger")),
                sample: group(&caps, "sample"),
            });
        }

        self.genuine.captures(name).map(|caps| Classification {
            kind: SignatureKind::Genuine,
            signer: group(&caps, "signer"),
            forger: None,
            sample: group(&caps, "sample"),
        })
    }
}

fn group(caps: &Captures<'_>, name: &str) -> String {
    caps.name(name)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Lowercase and deduplicate extensions, rejecting an empty set
pub fn normalize_extensions<S: AsRef<str>>(extensions: &[S]) -> DatasetResult<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(extensions.len());

    for ext in extensions {
        let ext = ext.as_ref().trim().to_lowercase();
        if !ext.is_empty() && !normalized.contains(&ext) {
            normalized.push(ext);
        }
    }

    if normalized.is_empty() {
        return Err(DatasetError::Pattern(
            "at least one file extension is required".to_string(),
        ));
    }

    Ok(normalized)
}
