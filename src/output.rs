//! Writers for the grouped catalog
//!
//! The catalog is serialized in memory first, written to a temporary file
//! next to the target and then renamed over it. A failed run never leaves a
//! half-written file at the output path.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::info;

use crate::data::GroupedCatalog;

/// Errors that can occur when writing the output file
#[derive(Debug, Error)]
pub enum WriteError {
    /// The output directory could not be created
    #[error("Failed to create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output file could not be written
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization failed
    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization failed
    #[error("Failed to serialize CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl OutputFormat {
    /// Parses a format name; only the exact lowercase names are accepted
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "json" => Some(OutputFormat::Json),
            "csv" => Some(OutputFormat::Csv),
            _ => None,
        }
    }

    /// File extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

/// Creates `dir` and its parents if missing
pub fn ensure_output_dir(dir: &Path) -> Result<(), WriteError> {
    fs::create_dir_all(dir).map_err(|source| WriteError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Writes `catalog` to `path` in the requested format, replacing any existing file
pub fn write_catalog(
    catalog: &GroupedCatalog,
    format: OutputFormat,
    path: &Path,
) -> Result<(), WriteError> {
    match format {
        OutputFormat::Json => write_json(catalog, path),
        OutputFormat::Csv => write_csv(catalog, path),
    }
}

/// Writes the catalog as an indented JSON object keyed by category
pub fn write_json(catalog: &GroupedCatalog, path: &Path) -> Result<(), WriteError> {
    let json = serde_json::to_string_pretty(catalog)?;
    write_file(path, json.as_bytes())?;
    info!(path = %path.display(), categories = catalog.category_count(), "Wrote JSON catalog");
    Ok(())
}

/// Writes the catalog as CSV: a header row, then one row per product
///
/// Rows follow catalog order. There is no category column.
pub fn write_csv(catalog: &GroupedCatalog, path: &Path) -> Result<(), WriteError> {
    let bytes = csv_bytes(catalog)?;
    write_file(path, &bytes)?;
    info!(path = %path.display(), rows = catalog.product_count(), "Wrote CSV catalog");
    Ok(())
}

fn csv_bytes(catalog: &GroupedCatalog) -> Result<Vec<u8>, WriteError> {
    // Header written by hand so an empty catalog still gets one.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(crate::data::EnrichedProduct::FIELD_NAMES)?;
    for product in catalog.products() {
        writer.serialize(product)?;
    }

    writer
        .into_inner()
        .map_err(|e| WriteError::Csv(csv::Error::from(e.into_error())))
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), WriteError> {
    let io_error = |source: std::io::Error| WriteError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // The temporary file is removed on drop if anything below fails.
    let mut temp = NamedTempFile::new_in(dir).map_err(io_error)?;
    temp.write_all(contents).map_err(io_error)?;
    temp.as_file().sync_all().map_err(io_error)?;
    temp.persist(path).map_err(|e| io_error(e.error))?;
    Ok(())
}
