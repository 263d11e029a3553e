//! Output writers.
//!
//! Both formats write to a temporary file next to the destination and rename it
//! into place on success. If anything fails the temporary file is dropped and
//! the destination is left as it was.

use std::fmt;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::Error;
use crate::record::Record;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(Error::InvalidParameter(format!("unsupported output file format {s}"))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Csv => f.write_str("csv"),
        }
    }
}

/// `""` is a comma, `"tab"` is a tab, anything else uses its first character.
/// The quote character and line terminators are rejected.
pub fn parse_delimiter(delimiter: &str) -> Result<u8, Error> {
    match delimiter {
        "" => Ok(b','),
        "tab" => Ok(b'\t'),
        other => match other.chars().next() {
            Some('"' | '\n' | '\r') => Err(Error::InvalidParameter(format!(
                "delimiter {other:?} collides with CSV quoting or line endings"
            ))),
            Some(c) if c.is_ascii() => Ok(c as u8),
            _ => Err(Error::InvalidParameter(format!(
                "delimiter must be a single-byte character, got {other:?}"
            ))),
        },
    }
}

/// A file that only appears at its final path once `finish` succeeds.
struct AtomicFileWriter {
    writer: BufWriter<NamedTempFile>,
    final_path: PathBuf,
}

impl AtomicFileWriter {
    fn new(final_path: &Path) -> Result<Self, Error> {
        let parent = match final_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let temp = NamedTempFile::new_in(parent).map_err(|e| output_error(final_path, e))?;
        Ok(Self {
            writer: BufWriter::new(temp),
            final_path: final_path.to_path_buf(),
        })
    }

    fn writer_mut(&mut self) -> &mut BufWriter<NamedTempFile> {
        &mut self.writer
    }

    fn finish(self) -> Result<PathBuf, Error> {
        let temp = self
            .writer
            .into_inner()
            .map_err(|e| output_error(&self.final_path, e.error()))?;
        temp.persist(&self.final_path)
            .map_err(|e| output_error(&self.final_path, e.error))?;
        Ok(self.final_path)
    }
}

fn output_error(path: &Path, e: impl fmt::Display) -> Error {
    Error::Output {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Writes the records as one JSON array, compact or indented with tabs.
pub fn write_json(path: &Path, records: &[Record], pretty: bool) -> Result<PathBuf, Error> {
    let mut file = AtomicFileWriter::new(path)?;
    let result = if pretty {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut ser = serde_json::Serializer::with_formatter(file.writer_mut(), formatter);
        records.serialize(&mut ser)
    } else {
        serde_json::to_writer(file.writer_mut(), records)
    };
    result.map_err(|e| output_error(path, e))?;
    file.writer_mut().write_all(b"\n").map_err(|e| output_error(path, e))?;
    file.finish()
}

/// Writes the records as CSV with `columns` as the column order.
/// Missing and null values are written as empty cells.
pub fn write_csv(
    path: &Path,
    columns: &[String],
    records: &[Record],
    delimiter: u8,
    header: bool,
) -> Result<PathBuf, Error> {
    let mut file = AtomicFileWriter::new(path)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(file.writer_mut());
        if header {
            writer.write_record(columns).map_err(|e| output_error(path, e))?;
        }
        for record in records {
            let line = columns
                .iter()
                .map(|c| record.get(c).map(|v| v.to_string()).unwrap_or_default());
            writer.write_record(line).map_err(|e| output_error(path, e))?;
        }
        writer.flush().map_err(|e| output_error(path, e))?;
    }
    file.finish()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::record::Scalar;

    fn records() -> Vec<Record> {
        let mut a = Record::new();
        a.insert("name".to_string(), Scalar::String("ann".to_string()));
        a.insert("age".to_string(), Scalar::Integer(30));
        a.insert("score".to_string(), Scalar::Null);
        let mut b = Record::new();
        b.insert("name".to_string(), Scalar::String("bob, jr".to_string()));
        b.insert("age".to_string(), Scalar::Integer(25));
        b.insert("score".to_string(), Scalar::Float(1.5));
        vec![a, b]
    }

    fn columns() -> Vec<String> {
        vec!["age".to_string(), "name".to_string(), "score".to_string()]
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter("").unwrap(), b',');
        assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
        assert_eq!(parse_delimiter("|").unwrap(), b'|');
        assert_eq!(parse_delimiter(";;").unwrap(), b';');
        assert!(matches!(parse_delimiter("é"), Err(Error::InvalidParameter(_))));
        for bad in ["\"", "\n", "\r\n", "\r"] {
            assert!(matches!(parse_delimiter(bad), Err(Error::InvalidParameter(_))), "{bad:?}");
        }
    }

    #[test]
    fn test_output_format() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("Csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_write_json_compact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        write_json(&path, &records(), false).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "[{\"age\":30,\"name\":\"ann\",\"score\":null},{\"age\":25,\"name\":\"bob, jr\",\"score\":1.5}]\n"
        );
    }

    #[test]
    fn test_write_json_pretty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        write_json(&path, &records()[..1], true).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "[\n\t{\n\t\t\"age\": 30,\n\t\t\"name\": \"ann\",\n\t\t\"score\": null\n\t}\n]\n");
    }

    #[test]
    fn test_write_csv_with_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&path, &columns(), &records(), b',', true).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "age,name,score\n30,ann,\n25,\"bob, jr\",1.5\n");
    }

    #[test]
    fn test_write_csv_tab_without_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.tsv");
        write_csv(&path, &columns(), &records(), b'\t', false).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "30\tann\t\n25\tbob, jr\t1.5\n");
    }

    #[test]
    fn test_write_csv_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&path, &columns(), &[], b',', true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "age,name,score\n");
    }

    #[test]
    fn test_failed_write_leaves_destination() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.json");
        assert!(matches!(write_json(&path, &records(), false), Err(Error::Output { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_write_json_rejects_non_finite_float() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        fs::write(&path, "OLD").unwrap();
        let mut record = Record::new();
        record.insert("x".to_string(), Scalar::Float(f64::NAN));
        assert!(matches!(write_json(&path, &[record], false), Err(Error::Output { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), "OLD");
    }

    #[test]
    fn test_overwrite_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        fs::write(&path, "OLD").unwrap();
        write_json(&path, &[], false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]\n");
        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
