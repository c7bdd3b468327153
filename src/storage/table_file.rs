//! On-disk access to a single table file.
//!
//! Layout: line 1 is the schema, every following line is one row. All reads
//! and writes go through the line codec; nothing is cached between calls.

use super::codec::{LineReader, encode_line};
use crate::core::{DbError, Result, Row, Schema};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

/// Longest table path accepted, in bytes.
pub const MAX_TABLE_PATH_LEN: usize = 259;

/// Prefix of in-progress rewrite files. `~` is not a valid name character,
/// so a leftover temp file never shows up as a table.
const TEMP_PREFIX: &str = "~flatdb";

// ============================================================================
// Write Options
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Rewrite through a temporary file and rename it over the table.
    pub atomic_rewrite: bool,
    /// fsync table data before returning from a write.
    pub sync: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic_rewrite: true,
            sync: false,
        }
    }
}

// ============================================================================
// Table File
// ============================================================================

#[derive(Debug, Clone)]
pub struct TableFile {
    base_dir: PathBuf,
    path: PathBuf,
    options: WriteOptions,
}

/// Schema plus every data row, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableContents {
    pub schema: Schema,
    pub rows: Vec<Row>,
}

impl TableFile {
    /// Resolves `table` under `base_dir`. The name must already be validated.
    pub fn locate(base_dir: &Path, table: &str, options: WriteOptions) -> Result<Self> {
        if table == "." || table == ".." {
            return Err(DbError::InvalidName(format!(
                "table name '{}' does not name a file",
                table
            )));
        }
        let path = base_dir.join(table);
        if path.as_os_str().len() > MAX_TABLE_PATH_LEN {
            return Err(DbError::InvalidName(format!(
                "table path '{}' exceeds {} bytes",
                path.display(),
                MAX_TABLE_PATH_LEN
            )));
        }
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
            path,
            options,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Creates the file and writes the schema line. Fails if the file exists.
    pub fn create(&self, schema: &Schema) -> Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .map_err(|e| DbError::io(&self.path, e))?;
        let mut writer = BufWriter::new(file);
        self.write_line(&mut writer, schema)?;
        self.finish(writer)?;
        log::debug!("created table file {}", self.path.display());
        Ok(())
    }

    pub fn remove(&self) -> Result<()> {
        fs::remove_file(&self.path).map_err(|e| DbError::io(&self.path, e))?;
        log::debug!("removed table file {}", self.path.display());
        Ok(())
    }

    pub fn read_schema(&self) -> Result<Schema> {
        let mut reader = self.open_reader()?;
        self.next_schema(&mut reader)
    }

    pub fn read_all(&self) -> Result<TableContents> {
        let mut reader = self.open_reader()?;
        let schema = self.next_schema(&mut reader)?;
        let width = schema.column_count();

        let mut rows = Vec::new();
        while let Some(row) = reader.next_values()? {
            if row.len() != width {
                return Err(DbError::decode(
                    &self.path,
                    reader.line_no(),
                    format!("expected {} fields, found {}", width, row.len()),
                ));
            }
            rows.push(row);
        }
        log::debug!("read {} rows from {}", rows.len(), self.path.display());
        Ok(TableContents { schema, rows })
    }

    /// Appends one row without touching existing lines.
    pub fn append(&self, row: &Row) -> Result<()> {
        let line = encode_line(row)?;
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| DbError::io(&self.path, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| DbError::io(&self.path, e))?;
        if self.options.sync {
            file.sync_data().map_err(|e| DbError::io(&self.path, e))?;
        }
        Ok(())
    }

    /// Replaces the whole file with `schema` followed by `rows`.
    pub fn rewrite(&self, schema: &Schema, rows: &[Row]) -> Result<()> {
        if self.options.atomic_rewrite {
            self.rewrite_atomic(schema, rows)?;
        } else {
            self.rewrite_in_place(schema, rows)?;
        }
        log::debug!(
            "rewrote {} with {} rows (atomic: {})",
            self.path.display(),
            rows.len(),
            self.options.atomic_rewrite
        );
        Ok(())
    }

    fn rewrite_atomic(&self, schema: &Schema, rows: &[Row]) -> Result<()> {
        let temp = self.temp_file()?;
        let mut writer = BufWriter::new(temp);
        self.write_contents(&mut writer, schema, rows)?;
        let temp = writer
            .into_inner()
            .map_err(|e| DbError::io(&self.path, e.into_error()))?;
        if self.options.sync {
            temp.as_file()
                .sync_all()
                .map_err(|e| DbError::io(temp.path(), e))?;
        }
        temp.persist(&self.path)
            .map_err(|e| DbError::io(&self.path, e.error))?;
        Ok(())
    }

    fn temp_file(&self) -> Result<NamedTempFile> {
        Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&self.base_dir)
            .map_err(|e| DbError::io(&self.base_dir, e))
    }

    fn rewrite_in_place(&self, schema: &Schema, rows: &[Row]) -> Result<()> {
        let file = File::create(&self.path).map_err(|e| DbError::io(&self.path, e))?;
        let mut writer = BufWriter::new(file);
        self.write_contents(&mut writer, schema, rows)?;
        self.finish(writer)
    }

    fn write_contents<W: Write>(&self, writer: &mut W, schema: &Schema, rows: &[Row]) -> Result<()> {
        self.write_line(writer, schema)?;
        for row in rows {
            self.write_line(writer, row)?;
        }
        Ok(())
    }

    fn write_line<W: Write, T: serde::Serialize + ?Sized>(&self, writer: &mut W, values: &T) -> Result<()> {
        let line = encode_line(values)?;
        writer
            .write_all(line.as_bytes())
            .map_err(|e| DbError::io(&self.path, e))
    }

    fn finish(&self, writer: BufWriter<File>) -> Result<()> {
        let file = writer
            .into_inner()
            .map_err(|e| DbError::io(&self.path, e.into_error()))?;
        if self.options.sync {
            file.sync_all().map_err(|e| DbError::io(&self.path, e))?;
        }
        Ok(())
    }

    fn open_reader(&self) -> Result<LineReader<BufReader<File>>> {
        let file = File::open(&self.path).map_err(|e| DbError::io(&self.path, e))?;
        Ok(LineReader::new(BufReader::new(file), &self.path))
    }

    fn next_schema(&self, reader: &mut LineReader<BufReader<File>>) -> Result<Schema> {
        reader
            .next_decoded::<Schema>()?
            .ok_or_else(|| DbError::decode(&self.path, 1, "missing schema line"))
    }
}
