pub mod classify;
pub mod review;
pub mod schema;

use crate::record::{self, RawRecord};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Read raw records from a CSV or JSON file (or JSON on stdin with "-")
pub fn read_records(path: &Path) -> anyhow::Result<Vec<RawRecord>> {
    if path.as_os_str() == "-" {
        read_from_stdin()
    } else {
        read_from_file(path)
    }
}

fn read_from_file(path: &Path) -> anyhow::Result<Vec<RawRecord>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => record::read_records_json(reader),
        _ => record::read_records_csv(reader),
    }
}

fn read_from_stdin() -> anyhow::Result<Vec<RawRecord>> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
    }

    let cursor = io::Cursor::new(buffer);
    record::read_records_json(cursor)
}
