//! CSV bundles: one `<table name>.csv` per table, either in a directory or a zip archive.

use crate::domain::model::{Cell, RawTable, RawWorkbook};
use crate::utils::error::{DashboardError, Result};
use std::fs;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// Declared entry sizes are untrusted; larger entries grow as they are read.
const MAX_PREALLOCATED_ENTRY: u64 = 1 << 20;

pub fn read_csv_directory(dir: &Path) -> Result<RawWorkbook> {
    let source_name = dir.display().to_string();
    let entries = fs::read_dir(dir).map_err(|e| DashboardError::load(&source_name, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| DashboardError::load(&source_name, e))?.path();
        if path.is_file() && has_csv_extension(&path) {
            files.push(path);
        }
    }
    files.sort();

    let mut tables = Vec::with_capacity(files.len());
    for path in files {
        let Some(name) = table_name_for(&path) else {
            continue;
        };
        let bytes = fs::read(&path).map_err(|e| DashboardError::load(&source_name, e))?;
        tables.push(parse_csv_table(&source_name, name, &bytes)?);
    }

    tracing::debug!("Read {} CSV tables from {}", tables.len(), source_name);
    Ok(RawWorkbook {
        source_name,
        tables,
    })
}

pub fn read_csv_zip_path(path: &Path) -> Result<RawWorkbook> {
    let source_name = path.display().to_string();
    let file = fs::File::open(path).map_err(|e| DashboardError::load(&source_name, e))?;
    read_csv_zip(source_name, file)
}

pub fn read_csv_zip_bytes(name: &str, bytes: &[u8]) -> Result<RawWorkbook> {
    read_csv_zip(name.to_string(), Cursor::new(bytes))
}

fn read_csv_zip<R: Read + Seek>(source_name: String, reader: R) -> Result<RawWorkbook> {
    let mut archive = ZipArchive::new(reader).map_err(|e| DashboardError::load(&source_name, e))?;

    let mut tables = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| DashboardError::load(&source_name, e))?;
        if entry.is_dir() {
            continue;
        }

        let entry_name = entry.name().to_string();
        let entry_path = Path::new(&entry_name);
        // Skip resource-fork entries added by macOS archivers
        if entry_name.starts_with("__MACOSX") || !has_csv_extension(entry_path) {
            continue;
        }
        let Some(name) = table_name_for(entry_path) else {
            continue;
        };

        let mut bytes = Vec::with_capacity(entry_capacity(entry.size()));
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| DashboardError::load(&source_name, e))?;
        tables.push(parse_csv_table(&source_name, name, &bytes)?);
    }

    tracing::debug!("Read {} CSV tables from archive {}", tables.len(), source_name);
    Ok(RawWorkbook {
        source_name,
        tables,
    })
}

/// Parse one CSV file; the first record is the header row.
pub fn parse_csv_table(source_name: &str, name: String, bytes: &[u8]) -> Result<RawTable> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DashboardError::load(source_name, e))?;
        grid.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawTable::from_grid(name, grid))
}

fn entry_capacity(declared_size: u64) -> usize {
    declared_size.min(MAX_PREALLOCATED_ENTRY) as usize
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn table_name_for(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.trim().to_string())
        .filter(|stem| !stem.is_empty())
}
