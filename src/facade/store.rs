use crate::config::StoreConfig;
use crate::core::{
    DbError, Limit, Record, Result, RowFilter, Schema, validate_column_name, validate_table_name,
};
use crate::storage::TableFile;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{Level, debug_span, event};

/// Flat-file table store
///
/// Every table is one file directly under the base directory. Each call opens
/// the file it needs, does its work and closes it again; nothing is cached.
///
/// # Examples
///
/// ```
/// use flatdb::{TableStore, Record, record_from_value};
/// use serde_json::json;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = tempfile::tempdir()?;
/// let store = TableStore::open(dir.path())?;
///
/// store.create_table("users", &["no", "username", "password"])?;
/// store.insert_row("users", &record_from_value(json!({"no": 1, "username": "admin"}))?)?;
/// store.insert_row("users", &record_from_value(json!({"no": 2, "username": "root"}))?)?;
///
/// let is_root = |row: &Record| row["username"] == "root";
/// assert_eq!(store.delete_rows("users", Some(&is_root), -1)?, 1);
///
/// let rows = store.select_rows("users", None, None, -1)?;
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0]["password"], "");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct TableStore {
    config: StoreConfig,
}

impl TableStore {
    /// Store without a base directory. Every table operation fails with
    /// `DbError::InvalidPath` until `set_base_path` succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store rooted at `path`, which must be an existing directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(StoreConfig::new().base_path(path))
    }

    /// Like `open`, but fails when the configured base path is unusable.
    pub fn open_with_config(config: StoreConfig) -> Result<Self> {
        let requested = config.base_path.clone();
        let mut store = Self {
            config: StoreConfig {
                base_path: None,
                ..config
            },
        };
        match requested {
            Some(path) => store.set_base_path(path)?,
            None => return Err(DbError::InvalidPath("base path is not set".into())),
        }
        Ok(store)
    }

    /// Builds a store from `config`. An unusable base path is logged and left
    /// unset instead of failing construction.
    pub fn with_config(config: StoreConfig) -> Self {
        let requested = config.base_path.clone();
        let mut store = Self {
            config: StoreConfig {
                base_path: None,
                ..config
            },
        };
        if let Some(path) = requested {
            if let Err(err) = store.set_base_path(path) {
                log::debug!("store left unconfigured: {}", err);
            }
        }
        store
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn base_path(&self) -> Option<&Path> {
        self.config.base_path.as_deref()
    }

    /// Points the store at `path`. The path is canonicalised. On failure the
    /// previous base path stays in place and a warning is logged.
    pub fn set_base_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        match self.resolve_base_path(path.as_ref()) {
            Ok(resolved) => {
                log::debug!("base path set to {}", resolved.display());
                self.config.base_path = Some(resolved);
                Ok(())
            }
            Err(err) => {
                log::warn!("cannot use '{}' as base path: {}", path.as_ref().display(), err);
                Err(err)
            }
        }
    }

    /// True when a base path is configured and is still a directory.
    pub fn check_base_path(&self) -> bool {
        self.base_path().is_some_and(Path::is_dir)
    }

    fn resolve_base_path(&self, path: &Path) -> Result<PathBuf> {
        if !path.exists() && self.config.create_missing_dirs {
            fs::create_dir_all(path).map_err(|e| DbError::io(path, e))?;
        }
        let resolved = fs::canonicalize(path).map_err(|e| {
            DbError::InvalidPath(format!("'{}' does not exist: {}", path.display(), e))
        })?;
        if !resolved.is_dir() {
            return Err(DbError::InvalidPath(format!(
                "'{}' is not a directory",
                resolved.display()
            )));
        }
        Ok(resolved)
    }

    // ========================================================================
    // Table lifecycle
    // ========================================================================

    /// Creates `table` with the given columns. An empty column list writes an
    /// empty schema line (`[]`).
    pub fn create_table(&self, table: &str, columns: &[&str]) -> Result<()> {
        let _span = debug_span!("create_table", table).entered();
        let file = self.table_file(table)?;
        for column in columns {
            validate_column_name(column)?;
        }
        if file.exists() {
            return Err(DbError::TableExists(table.to_string()));
        }

        file.create(&Schema::new(columns.iter().copied()))
            .map_err(|err| match err {
                DbError::Io { source, .. } if source.kind() == std::io::ErrorKind::AlreadyExists => {
                    DbError::TableExists(table.to_string())
                }
                other => other,
            })?;
        event!(Level::DEBUG, columns = columns.len(), "table created");
        Ok(())
    }

    pub fn drop_table(&self, table: &str) -> Result<()> {
        let _span = debug_span!("drop_table", table).entered();
        let file = self.existing_table(table)?;
        file.remove()?;
        event!(Level::DEBUG, "table dropped");
        Ok(())
    }

    /// Discards every row, keeping the schema line.
    pub fn truncate_table(&self, table: &str) -> Result<()> {
        let _span = debug_span!("truncate_table", table).entered();
        let file = self.existing_table(table)?;
        let schema = file.read_schema()?;
        file.rewrite(&schema, &[])?;
        event!(Level::DEBUG, "table truncated");
        Ok(())
    }

    pub fn table_exists(&self, table: &str) -> Result<bool> {
        Ok(self.table_file(table)?.exists())
    }

    pub fn table_schema(&self, table: &str) -> Result<Schema> {
        self.existing_table(table)?.read_schema()
    }

    // ========================================================================
    // Rows
    // ========================================================================

    /// Appends one row. Columns missing from `values` are stored as `""`.
    pub fn insert_row(&self, table: &str, values: &Record) -> Result<()> {
        let _span = debug_span!("insert_row", table).entered();
        let file = self.existing_table(table)?;
        let schema = file.read_schema()?;
        Self::validate_values(&schema, values)?;

        file.append(&schema.to_row(values))?;
        event!(Level::DEBUG, "row inserted");
        Ok(())
    }

    /// Returns rows in file order.
    ///
    /// `columns` restricts each record to those columns (schema order is kept).
    /// `filter` sees the projected record and keeps the row only when it
    /// returns `true`; a filter column dropped by the projection is
    /// `ColumnNotFound`. At most `limit` rows are returned; a negative limit
    /// means no cap.
    pub fn select_rows(
        &self,
        table: &str,
        columns: Option<&[&str]>,
        filter: Option<&dyn RowFilter>,
        limit: impl Into<Limit>,
    ) -> Result<Vec<Record>> {
        let limit = limit.into();
        let _span = debug_span!("select_rows", table, ?limit).entered();
        let file = self.existing_table(table)?;
        let contents = file.read_all()?;
        let schema = &contents.schema;

        if let Some(columns) = columns {
            for column in columns {
                Self::require_column(schema, column, table)?;
            }
        }
        Self::validate_filter(schema, filter, table)?;
        if let (Some(columns), Some(filter)) = (columns, filter) {
            // the filter only sees projected columns
            if let Some(column) = filter
                .referenced_columns()
                .into_iter()
                .find(|column| !columns.contains(column))
            {
                return Err(DbError::ColumnNotFound(column.to_string(), table.to_string()));
            }
        }

        let mut selected = Vec::new();
        for row in contents.rows {
            if limit.is_reached(selected.len()) {
                break;
            }
            let record: Record = schema
                .columns()
                .iter()
                .zip(row)
                .filter(|(name, _)| columns.is_none_or(|cols| cols.contains(&name.as_str())))
                .map(|(name, value)| (name.clone(), value))
                .collect();

            if filter.is_some_and(|f| !f.matches(&record)) {
                continue;
            }
            selected.push(record);
        }

        event!(Level::DEBUG, rows = selected.len(), "rows selected");
        Ok(selected)
    }

    /// Removes rows for which `filter` returns `true`, up to `limit` of them.
    /// Rows after the limit is reached are kept as they are. Without a filter
    /// nothing is deleted. Returns the number of deleted rows.
    pub fn delete_rows(
        &self,
        table: &str,
        filter: Option<&dyn RowFilter>,
        limit: impl Into<Limit>,
    ) -> Result<usize> {
        let limit = limit.into();
        let _span = debug_span!("delete_rows", table, ?limit).entered();
        let file = self.existing_table(table)?;
        let contents = file.read_all()?;
        let schema = &contents.schema;
        Self::validate_filter(schema, filter, table)?;

        let Some(filter) = filter else {
            return Ok(0);
        };

        let mut kept = Vec::with_capacity(contents.rows.len());
        let mut deleted = 0;
        for row in contents.rows {
            if !limit.is_reached(deleted) && filter.matches(&schema.to_record(row.clone())) {
                deleted += 1;
                continue;
            }
            kept.push(row);
        }

        if deleted > 0 {
            file.rewrite(schema, &kept)?;
        }
        event!(Level::DEBUG, deleted, "rows deleted");
        Ok(deleted)
    }

    /// Overlays `values` onto every row matching `filter` (every row when no
    /// filter is given), up to `limit` rows. Returns the number of updated
    /// rows.
    pub fn update_rows(
        &self,
        table: &str,
        values: &Record,
        filter: Option<&dyn RowFilter>,
        limit: impl Into<Limit>,
    ) -> Result<usize> {
        let limit = limit.into();
        let _span = debug_span!("update_rows", table, ?limit).entered();
        let file = self.existing_table(table)?;
        let mut contents = file.read_all()?;
        let schema = &contents.schema;
        Self::validate_values(schema, values)?;
        Self::validate_filter(schema, filter, table)?;

        let mut updated = 0;
        for row in contents.rows.iter_mut() {
            if limit.is_reached(updated) {
                break;
            }
            let mut record = schema.to_record(row.clone());
            if filter.is_some_and(|f| !f.matches(&record)) {
                continue;
            }
            for (column, value) in values {
                record.insert(column.clone(), value.clone());
            }
            *row = schema.to_row(&record);
            updated += 1;
        }

        if updated > 0 {
            file.rewrite(schema, &contents.rows)?;
        }
        event!(Level::DEBUG, updated, "rows updated");
        Ok(updated)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn table_file(&self, table: &str) -> Result<TableFile> {
        let base = self
            .base_path()
            .ok_or_else(|| DbError::InvalidPath("base path is not set".into()))?;
        if !base.is_dir() {
            return Err(DbError::InvalidPath(format!(
                "'{}' is not a directory",
                base.display()
            )));
        }
        validate_table_name(table)?;
        TableFile::locate(base, table, self.config.write_options())
    }

    fn existing_table(&self, table: &str) -> Result<TableFile> {
        let file = self.table_file(table)?;
        if !file.exists() {
            return Err(DbError::TableNotFound(table.to_string()));
        }
        Ok(file)
    }

    fn validate_values(schema: &Schema, values: &Record) -> Result<()> {
        for column in values.keys() {
            if validate_column_name(column).is_err() || !schema.contains(column) {
                return Err(DbError::InvalidRow(format!(
                    "column '{}' is not part of the table",
                    column
                )));
            }
        }
        Ok(())
    }

    fn validate_filter(schema: &Schema, filter: Option<&dyn RowFilter>, table: &str) -> Result<()> {
        if let Some(filter) = filter {
            for column in filter.referenced_columns() {
                Self::require_column(schema, column, table)?;
            }
        }
        Ok(())
    }

    fn require_column(schema: &Schema, column: &str, table: &str) -> Result<()> {
        if schema.contains(column) {
            Ok(())
        } else {
            Err(DbError::ColumnNotFound(column.to_string(), table.to_string()))
        }
    }
}
