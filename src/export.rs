// src/export.rs

//! CSV export of the final posting set.
//!
//! Fixed column order; every posting carries every column, possibly empty.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::Result;
use crate::models::Posting;

/// Export column order.
pub const COLUMNS: [&str; 10] = [
    "role_name",
    "company_name",
    "location",
    "job_link",
    "employment_type",
    "team",
    "published_date",
    "compensation",
    "source",
    "job_id",
];

/// Quote a field when it contains a delimiter, quote or line break.
fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn row(posting: &Posting) -> String {
    let source = posting.source.as_str().to_string();
    let fields = [
        &posting.role_name,
        &posting.company_name,
        &posting.location,
        &posting.job_link,
        &posting.employment_type,
        &posting.team,
        &posting.published_date,
        &posting.compensation,
        &source,
        &posting.job_id,
    ];
    fields
        .iter()
        .map(|f| escape(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// Write postings to a CSV file in `output_dir`.
///
/// Returns `None` without writing when the posting list is empty. The
/// default filename is timestamped per run.
pub fn write_csv(
    postings: &[Posting],
    output_dir: &Path,
    filename: Option<String>,
) -> Result<Option<PathBuf>> {
    if postings.is_empty() {
        log::warn!("No postings to export");
        return Ok(None);
    }

    fs::create_dir_all(output_dir)?;
    let filename = filename.unwrap_or_else(|| {
        format!("fde_jobs_{}.csv", Local::now().format("%Y-%m-%d_%H-%M"))
    });
    let path = output_dir.join(filename);

    let mut contents = COLUMNS.join(",");
    contents.push('\n');
    for posting in postings {
        contents.push_str(&row(posting));
        contents.push('\n');
    }
    fs::write(&path, contents)?;

    log::info!("Saved {} postings to {}", postings.len(), path.display());
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobSource;
    use tempfile::TempDir;

    fn sample() -> Posting {
        Posting {
            role_name: "Forward Deployed Engineer".to_string(),
            company_name: "Acme, Inc.".to_string(),
            location: "NYC; New York, NY".to_string(),
            job_link: "https://example.com/job/1".to_string(),
            employment_type: "FullTime".to_string(),
            team: String::new(),
            published_date: "2026-07-08".to_string(),
            compensation: "Not disclosed".to_string(),
            source: JobSource::Greenhouse,
            job_id: "42".to_string(),
        }
    }

    #[test]
    fn escape_quotes_delimiters() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape("line\nbreak"), "\"line\nbreak\"");
        assert_eq!(escape("line\rbreak"), "\"line\rbreak\"");
    }

    #[test]
    fn writes_header_and_rows() {
        let tmp = TempDir::new().unwrap();
        let path = write_csv(&[sample()], tmp.path(), Some("out.csv".to_string()))
            .unwrap()
            .unwrap();

        let contents = fs::read_to_string(path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next().unwrap(), COLUMNS.join(","));
        let row = lines.next().unwrap();
        assert!(row.starts_with("Forward Deployed Engineer,\"Acme, Inc.\""));
        assert!(row.contains("Greenhouse"));
        assert!(row.ends_with(",42"));
    }

    #[test]
    fn empty_set_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let result = write_csv(&[], tmp.path(), Some("out.csv".to_string())).unwrap();
        assert!(result.is_none());
        assert!(!tmp.path().join("out.csv").exists());
    }
}
