//! Join the files written by `scrape` into two tables.
//!
//! Every `*.json*` metadata file becomes one row of `sites.csv`, with nested
//! objects flattened to dotted column names. Every `*.csv*` data file
//! (gzipped or not) is stacked into `data.csv`. Inputs are read in path
//! order and columns appear in the order they are first seen.

use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use indicatif::ProgressBar;
use serde_json::{Map, Value};
use tracing::info;

use crate::{cli::create_progress_bar, error::Error};

pub const SITES_FILE: &str = "sites.csv";
pub const DATA_FILE: &str = "data.csv";

pub async fn merge(input_directory: &Path, output_directory: &Path, verbose: bool) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(output_directory)
        .with_context(|| format!("could not create output directory {}", output_directory.display()))?;
    let sites_output = output_directory.join(SITES_FILE);
    let data_output = output_directory.join(DATA_FILE);
    let outputs = [sites_output.clone(), data_output.clone()];

    let metadata_files = list_files(input_directory, ".json", &outputs)?;
    let pb = progress_bar(verbose, metadata_files.len(), "Merging site metadata");
    let sites = merge_metadata(&metadata_files, &pb)?;
    sites.write(&sites_output)?;
    info!(
        "merged {} sites ({} columns) to {}",
        sites.len(),
        sites.columns().len(),
        sites_output.display()
    );

    let data_files = list_files(input_directory, ".csv", &outputs)?;
    let pb = progress_bar(verbose, data_files.len(), "Merging pollutant data");
    let data = merge_data(&data_files, &pb)?;
    data.write(&data_output)?;
    info!("merged {} rows of pollutant data to {}", data.len(), data_output.display());

    Ok((sites_output, data_output))
}

fn progress_bar(verbose: bool, len: usize, message: &str) -> ProgressBar {
    if verbose {
        create_progress_bar(len as u64, message.to_string())
    } else {
        ProgressBar::hidden()
    }
}

/// Files whose name contains `pattern`, sorted by path, leaving out `exclude`.
fn list_files(dir: &Path, pattern: &str, exclude: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let excluded: Vec<PathBuf> = exclude.iter().filter_map(|p| p.canonicalize().ok()).collect();
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir).with_context(|| format!("could not read {}", dir.display()))? {
        let path = entry?.path();
        let matches = path
            .file_name()
            .map(|name| name.to_string_lossy().contains(pattern))
            .unwrap_or(false);
        if !matches || !path.is_file() {
            continue;
        }
        if path.canonicalize().map(|p| excluded.contains(&p)).unwrap_or(false) {
            continue;
        }
        files.push(path);
    }
    files.sort();

    Ok(files)
}

/// A string table whose columns grow as rows with new keys arrive.
#[derive(Debug, Default)]
pub struct Table {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn push_row<I: IntoIterator<Item = (String, String)>>(&mut self, cells: I) {
        let mut row = vec![String::new(); self.columns.len()];
        for (column, value) in cells {
            let position = match self.index.get(&column) {
                Some(&position) => position,
                None => {
                    self.index.insert(column.clone(), self.columns.len());
                    self.columns.push(column);
                    row.push(String::new());
                    self.columns.len() - 1
                }
            };
            row[position] = value;
        }
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn write(&self, path: &Path) -> crate::error::Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        if !self.columns.is_empty() {
            writer.write_record(&self.columns)?;
        }
        for row in &self.rows {
            let padded = row
                .iter()
                .map(String::as_str)
                .chain(std::iter::repeat("").take(self.columns.len() - row.len()));
            writer.write_record(padded)?;
        }
        writer.flush()?;

        Ok(())
    }
}

pub fn merge_metadata(files: &[PathBuf], pb: &ProgressBar) -> crate::error::Result<Table> {
    let mut table = Table::default();

    for path in files {
        let object = match serde_json::from_reader(open(path)?) {
            Ok(Value::Object(object)) => object,
            Ok(_) => return Err(merge_error(path, "expected a JSON object")),
            Err(e) => return Err(merge_error(path, e)),
        };
        let mut cells = Vec::new();
        flatten("", &object, &mut cells);
        table.push_row(cells);
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(table)
}

pub fn merge_data(files: &[PathBuf], pb: &ProgressBar) -> crate::error::Result<Table> {
    let mut table = Table::default();

    for path in files {
        let mut reader = csv::Reader::from_reader(open(path)?);
        let headers = unique_headers(reader.headers().map_err(|e| merge_error(path, e))?);
        for record in reader.records() {
            let record = record.map_err(|e| merge_error(path, e))?;
            table.push_row(
                headers
                    .iter()
                    .zip(record.iter())
                    .map(|(h, v)| (h.clone(), v.to_string())),
            );
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(table)
}

/// Repeated header names get a `.1`, `.2`, ... suffix so no cell is dropped.
fn unique_headers(headers: &csv::StringRecord) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(headers.len());

    for header in headers {
        let mut name = header.to_string();
        let mut n = 0;
        while seen.contains(&name) {
            n += 1;
            name = format!("{header}.{n}");
        }
        seen.insert(name.clone());
        unique.push(name);
    }

    unique
}

/// Opens a file, decompressing it when the name ends in `.gz`.
fn open(path: &Path) -> crate::error::Result<Box<dyn Read>> {
    let file = BufReader::new(File::open(path)?);
    let gzipped = path.extension().map(|e| e == "gz").unwrap_or(false);

    if gzipped {
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

fn flatten(prefix: &str, object: &Map<String, Value>, cells: &mut Vec<(String, String)>) {
    for (key, value) in object {
        let column = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(inner) => flatten(&column, inner, cells),
            Value::Null => cells.push((column, String::new())),
            Value::String(s) => cells.push((column, s.clone())),
            other => cells.push((column, other.to_string())),
        }
    }
}

fn merge_error(path: &Path, reason: impl ToString) -> Error {
    Error::Merge {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

// -- Tests -------------------------------------------------------------------
