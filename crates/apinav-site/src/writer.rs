//! Page writer trait and error types.
//!
//! Finished [`ContentPage`]s are handed to a [`PageWriter`]. The filesystem
//! implementation lives in `apinav-storage-fs`; [`MemoryPageWriter`] keeps
//! pages in memory for tests and embedding.

use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use crate::content::ContentPage;

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum PageWriteErrorKind {
    /// Page id cannot be mapped to an output location.
    InvalidId,
    /// Permission denied.
    PermissionDenied,
    /// Page could not be serialized.
    Serialization,
    /// Other/unknown error category.
    Other,
}

/// Error returned when a page cannot be persisted.
#[derive(Debug)]
pub struct PageWriteError {
    /// Semantic error category.
    pub kind: PageWriteErrorKind,
    /// Id of the page being written.
    pub page_id: Option<String>,
    /// Output path (if applicable).
    pub path: Option<PathBuf>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl PageWriteError {
    #[must_use]
    pub fn new(kind: PageWriteErrorKind) -> Self {
        Self {
            kind,
            page_id: None,
            path: None,
            source: None,
        }
    }

    /// Attach the id of the page being written.
    #[must_use]
    pub fn with_page(mut self, id: impl Into<String>) -> Self {
        self.page_id = Some(id.into());
        self
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create an error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::PermissionDenied => PageWriteErrorKind::PermissionDenied,
            _ => PageWriteErrorKind::Other,
        };
        Self::new(kind).with_path(path).with_source(err)
    }
}

impl std::fmt::Display for PageWriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "Kind: source (page: id, path: /foo/bar)"
        let kind_str = match self.kind {
            PageWriteErrorKind::InvalidId => "Invalid page id",
            PageWriteErrorKind::PermissionDenied => "Permission denied",
            PageWriteErrorKind::Serialization => "Serialization failed",
            PageWriteErrorKind::Other => "Write failed",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        match (&self.page_id, &self.path) {
            (Some(id), Some(path)) => write!(f, " (page: {id}, path: {})", path.display()),
            (Some(id), None) => write!(f, " (page: {id})"),
            (None, Some(path)) => write!(f, " (path: {})", path.display()),
            (None, None) => Ok(()),
        }
    }
}

impl std::error::Error for PageWriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Persists finished content pages.
///
/// Called once per page, in page insertion order. An error aborts the batch.
pub trait PageWriter: Send + Sync {
    fn write_page(&self, page: &ContentPage) -> Result<(), PageWriteError>;
}

/// Writer that keeps pages in memory.
#[derive(Debug, Default)]
pub struct MemoryPageWriter {
    pages: RwLock<Vec<ContentPage>>,
    fail_on: Option<String>,
}

impl MemoryPageWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with [`PageWriteErrorKind::Other`] when asked to write page `id`.
    #[must_use]
    pub fn failing_on(id: impl Into<String>) -> Self {
        Self {
            pages: RwLock::default(),
            fail_on: Some(id.into()),
        }
    }

    /// Pages written so far, in write order.
    #[must_use]
    pub fn pages(&self) -> Vec<ContentPage> {
        self.pages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PageWriter for MemoryPageWriter {
    fn write_page(&self, page: &ContentPage) -> Result<(), PageWriteError> {
        if self.fail_on.as_deref() == Some(page.id.as_str()) {
            return Err(PageWriteError::new(PageWriteErrorKind::Other).with_page(&page.id));
        }

        self.pages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(page.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_page_and_path() {
        let err = PageWriteError::io(
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            "/out/Widget.json",
        )
        .with_page("Widget");

        assert_eq!(err.kind, PageWriteErrorKind::PermissionDenied);
        assert_eq!(
            err.to_string(),
            "Permission denied: denied (page: Widget, path: /out/Widget.json)"
        );
    }

    #[test]
    fn test_display_kind_only() {
        let err = PageWriteError::new(PageWriteErrorKind::InvalidId);

        assert_eq!(err.to_string(), "Invalid page id");
    }

    #[test]
    fn test_source_is_exposed() {
        use std::error::Error as _;

        let err = PageWriteError::io(std::io::Error::other("disk full"), "/out/x.json");

        assert_eq!(err.kind, PageWriteErrorKind::Other);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_memory_writer_records_pages() {
        let writer = MemoryPageWriter::new();

        writer.write_page(&ContentPage::placeholder("a")).unwrap();
        writer.write_page(&ContentPage::placeholder("b")).unwrap();

        let ids: Vec<_> = writer.pages().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_memory_writer_failing_on() {
        let writer = MemoryPageWriter::failing_on("b");

        writer.write_page(&ContentPage::placeholder("a")).unwrap();
        let err = writer
            .write_page(&ContentPage::placeholder("b"))
            .unwrap_err();

        assert_eq!(err.page_id.as_deref(), Some("b"));
        assert_eq!(writer.pages().len(), 1);
    }
}
