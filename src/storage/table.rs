//! CSV tables with a header row.
//!
//! Header names are matched case-insensitively and cells are trimmed. Columns
//! a row type does not know about are ignored, and missing columns read as
//! absent cells.

use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::de::DeserializeOwned;

use crate::domain::{RequirementRow, StructureRow};

/// Errors that can occur when reading a table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The file could not be opened.
    #[error("failed to open {path}")]
    Open {
        /// The table file.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The content is not valid CSV.
    #[error("failed to read {path}")]
    Csv {
        /// The table file, or `-` for in-memory input.
        path: PathBuf,
        /// The underlying error.
        source: csv::Error,
    },
}

/// Reads the structure table at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or is not valid CSV.
pub fn read_structure(path: &Path) -> Result<Vec<StructureRow>, TableError> {
    read_path(path)
}

/// Reads the requirement table at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or is not valid CSV.
pub fn read_requirements(path: &Path) -> Result<Vec<RequirementRow>, TableError> {
    read_path(path)
}

fn read_path<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, TableError> {
    let file = File::open(path).map_err(|source| TableError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let rows = read_rows(file).map_err(|source| TableError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Reads every data row of a CSV table from `reader`.
///
/// # Errors
///
/// Returns an error if the content is not valid CSV.
pub fn from_reader<T: DeserializeOwned>(reader: impl Read) -> Result<Vec<T>, TableError> {
    read_rows(reader).map_err(|source| TableError::Csv {
        path: PathBuf::from("-"),
        source,
    })
}

fn read_rows<T: DeserializeOwned>(reader: impl Read) -> Result<Vec<T>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: StringRecord = reader
        .headers()?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').to_lowercase())
        .collect();
    reader.set_headers(headers);

    reader.deserialize().collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn structure_table() {
        let csv = "id,type,title,description,required\n\
                   G,Part,Goals,Why,false\n\
                   G.1,section, Context ,,TRUE\n";
        let rows: Vec<StructureRow> = from_reader(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].id.as_deref(), Some("G.1"));
        assert_eq!(rows[1].kind.as_deref(), Some("section"));
        assert_eq!(rows[1].title.as_deref(), Some("Context"));
        assert_eq!(rows[1].required.as_deref(), Some("TRUE"));
    }

    #[test]
    fn requirement_headers_in_either_spelling() {
        let spaced = "ID,Description,Reference To,Attached Files\nG.1.1,x,S.1.1,a.png\n";
        let snake = "id,description,reference_to,attached_files\nG.1.1,x,S.1.1,a.png\n";

        for csv in [spaced, snake] {
            let rows: Vec<RequirementRow> = from_reader(csv.as_bytes()).unwrap();
            assert_eq!(rows[0].reference_to.as_deref(), Some("S.1.1"));
            assert_eq!(rows[0].attached_files.as_deref(), Some("a.png"));
        }
    }

    #[test]
    fn missing_columns_and_short_rows_read_as_absent() {
        let csv = "id,description,priority\nG.1.1,x\n\nG.1.2,y,High\n";
        let rows: Vec<RequirementRow> = from_reader(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].priority, None);
        assert_eq!(rows[0].parent, None);
        assert_eq!(rows[1].priority.as_deref(), Some("High"));
    }

    #[test]
    fn quoted_cells_keep_commas() {
        let csv = "id,description,reference to\nG.1.1,\"Fast, reliable\",\"S.1.1, S.1.2\"\n";
        let rows: Vec<RequirementRow> = from_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].description.as_deref(), Some("Fast, reliable"));
        assert_eq!(rows[0].reference_to.as_deref(), Some("S.1.1, S.1.2"));
    }

    #[test]
    fn reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"id,title\nG,Goals\n").unwrap();

        let rows = read_structure(file.path()).unwrap();
        assert_eq!(rows[0].title.as_deref(), Some("Goals"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let error = read_requirements(&tmp.path().join("nope.csv")).unwrap_err();
        assert!(matches!(error, TableError::Open { .. }));
    }
}
