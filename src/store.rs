//! CSV persistence: latest snapshots and a deduplicated history.

use std::{
    collections::HashSet,
    fs,
    path::Path,
};

use itertools::Itertools;
use serde::Serialize;

use crate::prelude::*;

/// Overwrites the snapshot with the latest records.
///
/// An empty batch leaves the previous snapshot untouched and returns `false`:
/// stale data beats an empty file.
#[instrument(skip_all)]
pub fn write_snapshot<R: Serialize>(records: &[R], path: &Path) -> Result<bool> {
    if records.is_empty() {
        warn!(path = %path.display(), "nothing to write, keeping the previous snapshot");
        return Ok(false);
    }

    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create `{}`", path.display()))?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!(path = %path.display(), n_records = records.len(), "snapshot written");
    Ok(true)
}

/// Merges the records into the history file and reports how many rows it
/// holds afterwards.
///
/// Rows matching an earlier row on all `identity` columns replace it, so a
/// re-fetch of unchanged data never grows the file. The result is stably
/// sorted by the `ordering` columns, compared as text, which is exactly right
/// for the ISO dates and timestamps stored here. A missing or unreadable
/// history file is started afresh; an empty batch writes nothing and
/// returns 0.
#[instrument(skip_all)]
pub fn upsert_history<R: Serialize>(
    records: &[R],
    path: &Path,
    identity: &[&str],
    ordering: &[&str],
) -> Result<usize> {
    if records.is_empty() {
        warn!(path = %path.display(), "nothing to merge into the history");
        return Ok(0);
    }

    let mut buffer = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
    }
    let mut reader = csv::Reader::from_reader(buffer.as_slice());
    let headers = reader.headers()?.clone();
    let new_rows: Vec<csv::StringRecord> = reader.records().try_collect()?;

    let identity_indexes = column_indexes(&headers, identity)?;
    let ordering_indexes = column_indexes(&headers, ordering)?;

    let mut combined = read_existing(path, &headers).unwrap_or_else(|error| {
        warn!(path = %path.display(), "starting the history afresh: {error:#}");
        Vec::new()
    });
    combined.extend(new_rows);

    // Keep the later of any two rows that agree on the identity columns.
    let keys = combined.iter().map(|row| key_of(row, &identity_indexes)).collect_vec();
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for (row, key) in combined.into_iter().zip(keys).rev() {
        if seen.insert(key) {
            merged.push(row);
        }
    }
    merged.reverse();
    merged.sort_by_cached_key(|row| key_of(row, &ordering_indexes));

    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create `{}`", path.display()))?;
    writer.write_record(&headers)?;
    for row in &merged {
        writer.write_record(row)?;
    }
    writer.flush()?;

    info!(path = %path.display(), n_rows = merged.len(), "history updated");
    Ok(merged.len())
}

fn read_existing(path: &Path, expected_headers: &csv::StringRecord) -> Result<Vec<csv::StringRecord>> {
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?;
    ensure!(headers == expected_headers, "the columns changed from {headers:?}");
    Ok(reader.records().try_collect()?)
}

fn column_indexes(headers: &csv::StringRecord, columns: &[&str]) -> Result<Vec<usize>> {
    columns
        .iter()
        .map(|column| {
            headers
                .iter()
                .position(|header| header == *column)
                .with_context(|| format!("missing column `{column}`"))
        })
        .collect()
}

fn key_of(row: &csv::StringRecord, indexes: &[usize]) -> Vec<String> {
    indexes.iter().map(|index| row.get(*index).unwrap_or_default().to_string()).collect()
}

fn ensure_parent(path: &Path) -> Result {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create `{}`", parent.display()))?;
    }
    Ok(())
}
