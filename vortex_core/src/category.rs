//! Extension-based file classification.

use serde::Serialize;
use std::fmt;
use std::path::Path;

/// The OS metadata file that is deleted wherever it is found.
pub const DEFAULT_SENTINEL: &str = "desktop.ini";

/// Coarse category a recognized file is sorted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    ImageJpeg,
    ImagePng,
    ImageGif,
    ImageWebp,
    ImageSvg,
    ImagePhotoshop,
    VideoMp4,
    DocumentPdf,
    DocumentWord,
    DocumentSpreadsheet,
    DocumentSpreadsheetMacro,
    DocumentPresentation,
    DocumentRtf,
    DocumentOutlook,
    DocumentText,
    DocumentMarkdown,
    DocumentCsv,
    DocumentHtml,
    CodeJavascript,
    CodePhp,
    CodeShell,
    ApplicationJnlp,
    ApplicationRdp,
    ArchiveZip,
    ArchiveIso,
    ExecutableMsi,
    ExecutableExe,
}

/// Recognized extensions (lowercase, no leading dot).
const EXTENSION_TABLE: &[(&str, Category)] = &[
    ("jpg", Category::ImageJpeg),
    ("jpeg", Category::ImageJpeg),
    ("png", Category::ImagePng),
    ("gif", Category::ImageGif),
    ("webp", Category::ImageWebp),
    ("svg", Category::ImageSvg),
    ("psd", Category::ImagePhotoshop),
    ("mp4", Category::VideoMp4),
    ("pdf", Category::DocumentPdf),
    ("docx", Category::DocumentWord),
    ("xlsx", Category::DocumentSpreadsheet),
    ("xlsm", Category::DocumentSpreadsheetMacro),
    ("pptx", Category::DocumentPresentation),
    ("rtf", Category::DocumentRtf),
    ("msg", Category::DocumentOutlook),
    ("txt", Category::DocumentText),
    ("ini", Category::DocumentText),
    ("c", Category::DocumentText),
    ("css", Category::DocumentText),
    ("sql", Category::DocumentText),
    ("env", Category::DocumentText),
    ("yml", Category::DocumentText),
    ("md", Category::DocumentMarkdown),
    ("csv", Category::DocumentCsv),
    ("htm", Category::DocumentHtml),
    ("html", Category::DocumentHtml),
    ("js", Category::CodeJavascript),
    ("php", Category::CodePhp),
    ("sh", Category::CodeShell),
    ("jnlp", Category::ApplicationJnlp),
    ("rdp", Category::ApplicationRdp),
    ("zip", Category::ArchiveZip),
    ("iso", Category::ArchiveIso),
    ("msi", Category::ExecutableMsi),
    ("exe", Category::ExecutableExe),
];

impl Category {
    /// Look up the category for an extension, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        EXTENSION_TABLE
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(ext))
            .map(|&(_, category)| category)
    }

    /// Directory name under the destination root.
    ///
    /// Always a single path component.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::ImageJpeg => "image-jpeg",
            Category::ImagePng => "image-png",
            Category::ImageGif => "image-gif",
            Category::ImageWebp => "image-webp",
            Category::ImageSvg => "image-svg",
            Category::ImagePhotoshop => "image-photoshop",
            Category::VideoMp4 => "video-mp4",
            Category::DocumentPdf => "document-pdf",
            Category::DocumentWord => "document-word",
            Category::DocumentSpreadsheet => "document-spreadsheet",
            Category::DocumentSpreadsheetMacro => "document-spreadsheet-macro",
            Category::DocumentPresentation => "document-presentation",
            Category::DocumentRtf => "document-rtf",
            Category::DocumentOutlook => "document-outlook",
            Category::DocumentText => "document-text",
            Category::DocumentMarkdown => "document-markdown",
            Category::DocumentCsv => "document-csv",
            Category::DocumentHtml => "document-html",
            Category::CodeJavascript => "code-javascript",
            Category::CodePhp => "code-php",
            Category::CodeShell => "code-shell",
            Category::ApplicationJnlp => "application-jnlp",
            Category::ApplicationRdp => "application-rdp",
            Category::ArchiveZip => "archive-zip",
            Category::ArchiveIso => "archive-iso",
            Category::ExecutableMsi => "executable-msi",
            Category::ExecutableExe => "executable-exe",
        }
    }

    /// Human label (a MIME type, may contain `/`).
    pub fn label(&self) -> &'static str {
        match self {
            Category::ImageJpeg => "image/jpeg",
            Category::ImagePng => "image/png",
            Category::ImageGif => "image/gif",
            Category::ImageWebp => "image/webp",
            Category::ImageSvg => "image/svg+xml",
            Category::ImagePhotoshop => "image/vnd.adobe.photoshop",
            Category::VideoMp4 => "video/mp4",
            Category::DocumentPdf => "application/pdf",
            Category::DocumentWord => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Category::DocumentSpreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            Category::DocumentSpreadsheetMacro => "application/vnd.ms-excel.sheet.macroEnabled.12",
            Category::DocumentPresentation => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            Category::DocumentRtf => "application/rtf",
            Category::DocumentOutlook => "application/vnd.ms-outlook",
            Category::DocumentText => "text/plain",
            Category::DocumentMarkdown => "text/markdown",
            Category::DocumentCsv => "text/csv",
            Category::DocumentHtml => "text/html",
            Category::CodeJavascript => "text/javascript",
            Category::CodePhp => "application/x-httpd-php",
            Category::CodeShell => "text/x-shellscript",
            Category::ApplicationJnlp => "application/x-java-jnlp-file",
            Category::ApplicationRdp => "application/rdp",
            Category::ArchiveZip => "application/zip",
            Category::ArchiveIso => "application/x-iso9660-image",
            Category::ExecutableMsi => "application/x-ms-installer",
            Category::ExecutableExe => "application/vnd.microsoft.portable-executable",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Result of classifying one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// OS metadata file: delete, never hash.
    Sentinel,
    /// Recognized extension.
    Known(Category),
    /// Missing or unmapped extension: leave in place.
    Unknown,
}

/// Everything after the last `.` of the file name, case preserved.
///
/// A dotfile such as `.env` yields `env`; `notes` and `notes.` yield `None`.
/// The stem need not be valid UTF-8, only the extension itself.
pub fn extension(path: &Path) -> Option<&str> {
    let name = path.file_name()?.as_encoded_bytes();
    let dot = name.iter().rposition(|&b| b == b'.')?;
    let ext = std::str::from_utf8(&name[dot + 1..]).ok()?;
    if ext.is_empty() { None } else { Some(ext) }
}

/// Maps file names to a [`Classification`].
#[derive(Debug, Clone)]
pub struct Classifier {
    sentinels: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            sentinels: vec![DEFAULT_SENTINEL.to_string()],
        }
    }
}

impl Classifier {
    /// Create a classifier with extra sentinel names on top of the default one.
    pub fn with_sentinels<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classifier = Self::default();
        for name in extra {
            let name = name.into();
            if !classifier.sentinels.contains(&name) {
                classifier.sentinels.push(name);
            }
        }
        classifier
    }

    /// Whether a bare file name is a sentinel (exact match).
    pub fn is_sentinel_name(&self, name: &str) -> bool {
        self.sentinels.iter().any(|s| s == name)
    }

    /// Whether the last component of `path` is a sentinel.
    pub fn is_sentinel(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| self.is_sentinel_name(n))
    }

    /// Classify a path by its file name.
    pub fn classify(&self, path: &Path) -> Classification {
        if self.is_sentinel(path) {
            return Classification::Sentinel;
        }
        match extension(path).and_then(Category::from_extension) {
            Some(category) => Classification::Known(category),
            None => Classification::Unknown,
        }
    }

    /// Sentinel names in effect.
    pub fn sentinels(&self) -> &[String] {
        &self.sentinels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn classify(name: &str) -> Classification {
        Classifier::default().classify(Path::new(name))
    }

    #[test]
    fn test_case_insensitive_lookup() {
        assert_eq!(classify("photo.JPG"), Classification::Known(Category::ImageJpeg));
        assert_eq!(classify("photo.jpeg"), Classification::Known(Category::ImageJpeg));
        assert_eq!(classify("Report.PdF"), Classification::Known(Category::DocumentPdf));
    }

    #[test]
    fn test_only_last_extension_counts() {
        assert_eq!(
            classify("archive.pdf.txt"),
            Classification::Known(Category::DocumentText)
        );
        assert_eq!(classify("movie.mp4.part"), Classification::Unknown);
    }

    #[test]
    fn test_unknown_extensions() {
        assert_eq!(classify("notes"), Classification::Unknown);
        assert_eq!(classify("notes."), Classification::Unknown);
        assert_eq!(classify("song.flac"), Classification::Unknown);
    }

    #[test]
    fn test_dotfile_extension() {
        assert_eq!(extension(Path::new("/x/.env")), Some("env"));
        assert_eq!(classify(".env"), Classification::Known(Category::DocumentText));
    }

    #[test]
    fn test_extension_preserves_case() {
        assert_eq!(extension(Path::new("/a/b/photo.JPG")), Some("JPG"));
        assert_eq!(extension(Path::new("/a/b/noext")), None);
    }

    #[test]
    #[cfg(unix)]
    fn test_non_utf8_stem_keeps_extension() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"/in/caf\xe9.jpg"));
        assert_eq!(extension(path), Some("jpg"));
        assert_eq!(
            Classifier::default().classify(path),
            Classification::Known(Category::ImageJpeg)
        );

        let bad_ext = Path::new(OsStr::from_bytes(b"/in/photo.jp\xe9"));
        assert_eq!(extension(bad_ext), None);
    }

    #[test]
    fn test_sentinel_matches_exact_name() {
        assert_eq!(classify("desktop.ini"), Classification::Sentinel);
        assert_eq!(classify("/deep/dir/desktop.ini"), Classification::Sentinel);
        // Same extension, different name: ordinary text file
        assert_eq!(classify("setup.ini"), Classification::Known(Category::DocumentText));
        assert_eq!(classify("Desktop.INI"), Classification::Known(Category::DocumentText));
    }

    #[test]
    fn test_extra_sentinels() {
        let classifier = Classifier::with_sentinels([".DS_Store", "desktop.ini"]);
        assert_eq!(classifier.sentinels().len(), 2);
        assert_eq!(
            classifier.classify(Path::new("/a/.DS_Store")),
            Classification::Sentinel
        );
    }

    #[test]
    fn test_dir_names_are_single_safe_components() {
        let mut seen = HashSet::new();
        for &(_, category) in EXTENSION_TABLE {
            let name = category.dir_name();
            assert!(!name.contains('/') && !name.contains('\\'), "{name}");
            assert!(name.chars().all(|c| c.is_ascii_lowercase() || c == '-'));
            seen.insert(name);
        }
        // Labels may contain separators; dir names never do
        assert!(Category::DocumentText.label().contains('/'));
        assert_eq!(seen.len(), 27);
    }

    #[test]
    fn test_table_extensions_are_lowercase_and_unique() {
        let mut seen = HashSet::new();
        for &(ext, _) in EXTENSION_TABLE {
            assert_eq!(ext, ext.to_ascii_lowercase());
            assert!(seen.insert(ext), "duplicate extension {ext}");
        }
    }
}
