//! Filesystem output for apinav.
//!
//! [`FsPageWriter`] implements [`PageWriter`] by writing every content page
//! to `<output_dir>/<page id>.json`. The same directory receives the
//! navigation tree and search index via [`FsPageWriter::write_artifact`].
//! File names passed to [`FsPageWriter::reserving`] are never used for
//! pages, so a page cannot be overwritten by a data file.
//!
//! # Example
//!
//! ```ignore
//! use apinav_site::ApiDataFactory;
//! use apinav_storage_fs::FsPageWriter;
//!
//! let writer = FsPageWriter::create("site/api", true)?
//!     .reserving(["navigation.json", "search-keywords.json"]);
//! let data = ApiDataFactory::new().create_data(&records, &writer)?;
//! writer.write_artifact("navigation.json", &data.navigation)?;
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use apinav_site::{ContentPage, PageWriteError, PageWriteErrorKind, PageWriter};
use serde::Serialize;

/// Extension of every file this writer produces.
const EXTENSION: &str = "json";

/// Writes pages and data files as JSON into a single directory.
#[derive(Debug)]
pub struct FsPageWriter {
    root: PathBuf,
    pretty: bool,
    reserved: Vec<String>,
}

impl FsPageWriter {
    /// Create the output directory (and parents) and return a writer for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn create(root: impl Into<PathBuf>, pretty: bool) -> Result<Self, PageWriteError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| PageWriteError::io(e, &root))?;
        Ok(Self {
            root,
            pretty,
            reserved: Vec::new(),
        })
    }

    /// Keep `file_names` free for data files written with
    /// [`write_artifact`](Self::write_artifact).
    #[must_use]
    pub fn reserving<I, S>(mut self, file_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved.extend(file_names.into_iter().map(Into::into));
        self
    }

    /// Output directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a page with the given id is written to.
    ///
    /// # Errors
    ///
    /// Returns [`PageWriteErrorKind::InvalidId`] when the id would escape the
    /// output directory, name no file or land on a reserved file name.
    pub fn page_path(&self, id: &str) -> Result<PathBuf, PageWriteError> {
        if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
            return Err(PageWriteError::new(PageWriteErrorKind::InvalidId).with_page(id));
        }

        let file_name = format!("{id}.{EXTENSION}");
        let path = self.root.join(&file_name);
        // Case-insensitive filesystems would still collide.
        if self
            .reserved
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(&file_name))
        {
            return Err(PageWriteError::new(PageWriteErrorKind::InvalidId)
                .with_page(id)
                .with_path(path));
        }
        Ok(path)
    }

    /// Write an arbitrary serializable value to `<output_dir>/<file_name>`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write_artifact<T: Serialize + ?Sized>(
        &self,
        file_name: &str,
        value: &T,
    ) -> Result<PathBuf, PageWriteError> {
        let path = self.root.join(file_name);
        self.write_json(&path, value)?;
        tracing::debug!(path = %path.display(), "Wrote data file");
        Ok(path)
    }

    fn write_json<T: Serialize + ?Sized>(
        &self,
        path: &Path,
        value: &T,
    ) -> Result<(), PageWriteError> {
        let serialized = if self.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        };
        let mut buf = serialized.map_err(|e| {
            PageWriteError::new(PageWriteErrorKind::Serialization)
                .with_path(path)
                .with_source(e)
        })?;
        if self.pretty {
            buf.push(b'\n');
        }
        fs::write(path, &buf).map_err(|e| PageWriteError::io(e, path))
    }
}

impl PageWriter for FsPageWriter {
    fn write_page(&self, page: &ContentPage) -> Result<(), PageWriteError> {
        let path = self.page_path(&page.id)?;
        self.write_json(&path, page)
            .map_err(|e| e.with_page(&page.id))?;
        tracing::trace!(page = %page.id, "Wrote page");
        Ok(())
    }
}
