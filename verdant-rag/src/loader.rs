//! Document loading from files on disk.
//!
//! The [`DocumentStore`] picks a [`DocumentLoader`] from the file extension:
//!
//! - [`PdfLoader`] - one [`Document`] per page
//! - [`CsvLoader`] - one [`Document`] per data row

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::document::{Document, SourceLocation};
use crate::error::{RagError, Result};

/// The header name treated as primary content when no column is configured.
pub const DEFAULT_CONTENT_COLUMN: &str = "content";

/// Reads one file into a sequence of [`Document`]s.
pub trait DocumentLoader: Send + Sync {
    /// Load every document contained in `path`.
    fn load(&self, path: &Path) -> Result<Vec<Document>>;
}

fn load_error(path: &Path, message: impl Into<String>) -> RagError {
    RagError::Load { path: path.to_path_buf(), message: message.into() }
}

fn base_metadata(path: &Path) -> HashMap<String, String> {
    HashMap::from([("source".to_string(), path.display().to_string())])
}

/// Extracts text page by page from a PDF file.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLoader;

impl DocumentLoader for PdfLoader {
    fn load(&self, path: &Path) -> Result<Vec<Document>> {
        let pdf = lopdf::Document::load(path).map_err(|e| {
            error!(path = %path.display(), error = %e, "failed to parse pdf");
            load_error(path, format!("invalid pdf: {e}"))
        })?;

        let mut documents = Vec::new();
        // Page numbers from lopdf are 1-based and ordered.
        for (page, page_number) in pdf.get_pages().into_keys().enumerate() {
            let text = pdf.extract_text(&[page_number]).map_err(|e| {
                error!(path = %path.display(), page, error = %e, "failed to extract page text");
                load_error(path, format!("text extraction failed on page {page}: {e}"))
            })?;

            let mut metadata = base_metadata(path);
            metadata.insert("page".to_string(), page.to_string());

            documents.push(Document {
                id: format!("{}#page={page}", path.display()),
                text,
                source: path.to_path_buf(),
                location: SourceLocation::Page(page),
                metadata,
            });
        }

        debug!(path = %path.display(), page_count = documents.len(), "loaded pdf");
        Ok(documents)
    }
}

/// Extracts text row by row from a CSV file with a header line.
///
/// When the content column is present in the header, its value becomes the
/// document text and the remaining columns become metadata. Otherwise every
/// column is rendered as a `header: value` line.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    content_column: Option<String>,
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self { content_column: Some(DEFAULT_CONTENT_COLUMN.to_string()) }
    }
}

impl CsvLoader {
    /// Create a loader using the `content` column when it exists.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `column` as primary content when it is present in the header.
    pub fn with_content_column(mut self, column: impl Into<String>) -> Self {
        self.content_column = Some(column.into());
        self
    }

    /// Always render every column into the document text.
    pub fn without_content_column(mut self) -> Self {
        self.content_column = None;
        self
    }
}

impl DocumentLoader for CsvLoader {
    fn load(&self, path: &Path) -> Result<Vec<Document>> {
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| load_error(path, format!("failed to open csv: {e}")))?;
        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| load_error(path, format!("failed to read csv header: {e}")))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let content_index = self
            .content_column
            .as_deref()
            .and_then(|column| headers.iter().position(|h| h == column));

        let mut documents = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| {
                error!(path = %path.display(), row, error = %e, "malformed csv row");
                load_error(path, format!("malformed row {row}: {e}"))
            })?;

            let mut metadata = base_metadata(path);
            metadata.insert("row".to_string(), row.to_string());

            let text = match content_index {
                Some(index) => {
                    // `source` and `row` belong to the loader and are never overwritten.
                    for (i, (header, value)) in headers.iter().zip(record.iter()).enumerate() {
                        if i != index {
                            metadata
                                .entry(header.clone())
                                .or_insert_with(|| value.trim().to_string());
                        }
                    }
                    record.get(index).unwrap_or_default().trim().to_string()
                }
                None => headers
                    .iter()
                    .zip(record.iter())
                    .map(|(header, value)| format!("{header}: {}", value.trim()))
                    .collect::<Vec<_>>()
                    .join("\n"),
            };

            documents.push(Document {
                id: format!("{}#row={row}", path.display()),
                text,
                source: path.to_path_buf(),
                location: SourceLocation::Row(row),
                metadata,
            });
        }

        debug!(path = %path.display(), row_count = documents.len(), "loaded csv");
        Ok(documents)
    }
}

/// The file formats the [`DocumentStore`] can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `.pdf`
    Pdf,
    /// `.csv`
    Csv,
}

impl FileKind {
    /// Classify a path by its lower-cased extension.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::UnsupportedFileType`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default();

        match extension.as_str() {
            ".pdf" => Ok(Self::Pdf),
            ".csv" => Ok(Self::Csv),
            _ => Err(RagError::UnsupportedFileType { extension }),
        }
    }
}

/// Loads documents from a file path, dispatching on the file extension.
///
/// # Example
///
/// ```rust,ignore
/// use verdant_rag::DocumentStore;
///
/// let store = DocumentStore::new();
/// let pages = store.load("asset/2024_annual_report.pdf")?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    pdf: PdfLoader,
    csv: CsvLoader,
}

impl DocumentStore {
    /// Create a store with the default PDF and CSV loaders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the CSV loader (e.g. to choose a different content column).
    pub fn with_csv_loader(mut self, loader: CsvLoader) -> Self {
        self.csv = loader;
        self
    }

    /// Load every document contained in `path`.
    ///
    /// The extension is checked before the file system is touched.
    ///
    /// # Errors
    ///
    /// - [`RagError::UnsupportedFileType`] if the extension is neither `.pdf` nor `.csv`
    /// - [`RagError::FileNotFound`] if the path does not exist
    /// - [`RagError::Load`] if the content cannot be parsed
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Vec<Document>> {
        let path = path.as_ref();
        let kind = FileKind::from_path(path)?;
        if !path.exists() {
            return Err(RagError::FileNotFound { path: PathBuf::from(path) });
        }

        match kind {
            FileKind::Pdf => self.pdf.load(path),
            FileKind::Csv => self.csv.load(path),
        }
    }
}
