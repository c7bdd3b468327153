use super::{Cli, Command, FilterArgs};
use anyhow::{Context, Result};
use flatdb::{AllOf, ColumnEquals, DbError, RowFilter, StoreConfig, TableStore, Value, record_from_value};
use std::io::Write;

pub struct App {
    pub store: TableStore,
}

impl App {
    pub fn new(cli: &Cli) -> Result<Self> {
        let config = StoreConfig::new()
            .base_path(&cli.dir)
            .create_missing_dirs(cli.create_dir)
            .atomic_rewrite(!cli.in_place)
            .sync_writes(cli.sync);
        let store = TableStore::open_with_config(config)
            .with_context(|| format!("cannot open database directory '{}'", cli.dir.display()))?;
        Ok(Self { store })
    }

    pub fn run<W: Write>(&self, command: Command, out: &mut W) -> Result<()> {
        match command {
            Command::Create { table, columns } => {
                let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
                self.store.create_table(&table, &columns)?;
                writeln!(out, "created {}", table)?;
            }
            Command::Drop { table } => {
                self.store.drop_table(&table)?;
                writeln!(out, "dropped {}", table)?;
            }
            Command::Truncate { table } => {
                self.store.truncate_table(&table)?;
                writeln!(out, "truncated {}", table)?;
            }
            Command::Schema { table } => {
                let schema = self.store.table_schema(&table)?;
                writeln!(out, "{}", serde_json::to_string(&schema)?)?;
            }
            Command::Insert { table, row } => {
                let record = parse_row(&row)?;
                self.store.insert_row(&table, &record)?;
                writeln!(out, "inserted 1 row")?;
            }
            Command::Select {
                table,
                columns,
                filter,
            } => {
                let columns: Option<Vec<&str>> = columns
                    .as_ref()
                    .map(|cols| cols.iter().map(String::as_str).collect());
                let predicate = build_filter(&filter)?;
                let rows = self.store.select_rows(
                    &table,
                    columns.as_deref(),
                    as_dyn(&predicate),
                    filter.limit,
                )?;
                for row in rows {
                    writeln!(out, "{}", serde_json::to_string(&row)?)?;
                }
            }
            Command::Update { table, row, filter } => {
                let record = parse_row(&row)?;
                let predicate = build_filter(&filter)?;
                let updated =
                    self.store
                        .update_rows(&table, &record, as_dyn(&predicate), filter.limit)?;
                writeln!(out, "updated {} rows", updated)?;
            }
            Command::Delete { table, all, filter } => {
                let predicate = if all {
                    Some(AllOf::new())
                } else {
                    build_filter(&filter)?
                };
                if predicate.is_none() {
                    anyhow::bail!(DbError::InvalidArgument(
                        "delete needs --where or --all".into()
                    ));
                }
                let deleted = self
                    .store
                    .delete_rows(&table, as_dyn(&predicate), filter.limit)?;
                writeln!(out, "deleted {} rows", deleted)?;
            }
            Command::Demo => super::demo::run(&self.store, out)?,
        }
        Ok(())
    }
}

fn as_dyn(filter: &Option<AllOf>) -> Option<&dyn RowFilter> {
    filter.as_ref().map(|f| f as &dyn RowFilter)
}

fn parse_row(text: &str) -> flatdb::Result<flatdb::Record> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| DbError::InvalidRow(format!("row is not valid JSON: {}", e)))?;
    record_from_value(value)
}

/// Parses `column=value`. The value is JSON when it parses as JSON, text
/// otherwise, so `no=1` compares against the number and `name=root` against
/// the string.
pub fn parse_where(clause: &str) -> flatdb::Result<ColumnEquals> {
    let (column, raw) = clause.split_once('=').ok_or_else(|| {
        DbError::InvalidArgument(format!("expected COLUMN=VALUE, got '{}'", clause))
    })?;
    if column.is_empty() {
        return Err(DbError::InvalidArgument(format!(
            "missing column in '{}'",
            clause
        )));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok(ColumnEquals::new(column, value))
}

fn build_filter(args: &FilterArgs) -> flatdb::Result<Option<AllOf>> {
    if args.filters.is_empty() {
        return Ok(None);
    }
    let mut all = AllOf::new();
    for clause in &args.filters {
        all.push(parse_where(clause)?);
    }
    Ok(Some(all))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn app(dir: &TempDir) -> App {
        App {
            store: TableStore::open(dir.path()).unwrap(),
        }
    }

    fn run(app: &App, command: Command) -> String {
        let mut out = Vec::new();
        app.run(command, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn filter(clauses: &[&str], limit: i64) -> FilterArgs {
        FilterArgs {
            filters: clauses.iter().map(|c| c.to_string()).collect(),
            limit,
        }
    }

    #[test]
    fn test_parse_where() {
        let clause = parse_where("no=1").unwrap();
        assert_eq!(clause.column(), "no");
        assert_eq!(clause.value(), &json!(1));

        let clause = parse_where("username=john doe").unwrap();
        assert_eq!(clause.value(), &json!("john doe"));

        let clause = parse_where("password=\"1234\"").unwrap();
        assert_eq!(clause.value(), &json!("1234"));

        assert!(matches!(parse_where("nope"), Err(DbError::InvalidArgument(_))));
        assert!(matches!(parse_where("=1"), Err(DbError::InvalidArgument(_))));
    }

    #[test]
    fn test_commands_end_to_end() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);

        run(&app, Command::Create {
            table: "users".into(),
            columns: vec!["no".into(), "username".into(), "password".into()],
        });
        for row in [
            r#"{"no": 1, "username": "admin", "password": "1234"}"#,
            r#"{"no": 2, "username": "root"}"#,
        ] {
            run(&app, Command::Insert { table: "users".into(), row: row.into() });
        }

        let out = run(&app, Command::Delete {
            table: "users".into(),
            all: false,
            filter: filter(&["username=root"], -1),
        });
        assert_eq!(out, "deleted 1 rows\n");

        let out = run(&app, Command::Select {
            table: "users".into(),
            columns: None,
            filter: FilterArgs { filters: vec![], limit: -1 },
        });
        assert_eq!(out, "{\"no\":1,\"username\":\"admin\",\"password\":\"1234\"}\n");

        let out = run(&app, Command::Schema { table: "users".into() });
        assert_eq!(out, "[\"no\",\"username\",\"password\"]\n");
    }

    #[test]
    fn test_delete_requires_filter_or_all() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        run(&app, Command::Create { table: "t".into(), columns: vec!["a".into()] });

        let mut out = Vec::new();
        let err = app
            .run(
                Command::Delete { table: "t".into(), all: false, filter: FilterArgs::default() },
                &mut out,
            )
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<DbError>(), Some(DbError::InvalidArgument(_))));
    }

    #[test]
    fn test_insert_rejects_non_object() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        run(&app, Command::Create { table: "t".into(), columns: vec!["a".into()] });

        let mut out = Vec::new();
        let err = app
            .run(Command::Insert { table: "t".into(), row: "[1]".into() }, &mut out)
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<DbError>(), Some(DbError::InvalidRow(_))));
    }
}
