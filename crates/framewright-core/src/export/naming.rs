//! Output filenames for exported photos.

use serde::{Deserialize, Serialize};

use crate::encode::ExportFormat;

/// How exported files are named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "lowercase")]
pub enum NamingScheme {
    /// `prefix_001.jpg`, `prefix_002.jpg`, ... numbered from 1.
    Sequential { prefix: String },
    /// The original name without its extension, plus `suffix`.
    Suffix { suffix: String },
}

impl Default for NamingScheme {
    fn default() -> Self {
        NamingScheme::Suffix {
            suffix: "_edited".to_string(),
        }
    }
}

impl NamingScheme {
    /// File name for the photo at `index` (0-based) named `original`.
    pub fn file_name(&self, index: usize, original: &str, format: ExportFormat) -> String {
        let ext = format.extension();
        match self {
            NamingScheme::Sequential { prefix } => {
                let prefix = if prefix.is_empty() { "photo" } else { prefix };
                format!("{prefix}_{:03}.{ext}", index + 1)
            }
            NamingScheme::Suffix { suffix } => {
                let base = strip_extension(original);
                let base = if base.is_empty() { "photo" } else { base };
                format!("{base}{suffix}.{ext}")
            }
        }
    }
}

/// `IMG_1.HEIC` -> `IMG_1`; dotfiles and names without a dot stay whole.
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(i) => &name[..i],
    }
}
