//! Sample session against a `users` table: create, insert, delete, update,
//! select, truncate. Prints the selected rows before truncating.

use anyhow::{Context, Result};
use flatdb::{DbError, Record, TableStore, record_from_value};
use serde_json::json;
use std::io::Write;

const TABLE: &str = "users";

pub fn run<W: Write>(store: &TableStore, out: &mut W) -> Result<()> {
    match store.drop_table(TABLE) {
        Ok(()) | Err(DbError::TableNotFound(_)) => {}
        Err(err) => return Err(err.into()),
    }

    store.create_table(TABLE, &["no", "username", "password"])?;

    for row in [
        json!({"no": 1, "username": "admin", "password": "1234"}),
        json!({"no": 2, "username": "guest", "password": "guest"}),
        json!({"no": 3, "username": "root"}),
        json!({"no": 4, "username": "123", "password": "123"}),
        json!({"no": 5, "username": "홍길동", "password": false}),
    ] {
        store.insert_row(TABLE, &record_from_value(row)?)?;
    }

    let numbers = store.select_rows(TABLE, Some(&["no"]), None, -1)?;
    let mut next_no = numbers
        .last()
        .and_then(|row| row["no"].as_i64())
        .context("users table has no numbered rows")?;

    for (username, password) in [("john doe", "asd123"), ("jane doe", "zxc456")] {
        next_no += 1;
        let row = json!({"no": next_no, "username": username, "password": password});
        store.insert_row(TABLE, &record_from_value(row)?)?;
    }

    let is_root = |row: &Record| row["username"] == "root";
    store.delete_rows(TABLE, Some(&is_root), -1)?;

    let every_row = |_: &Record| true;
    let secret = record_from_value(json!({"password": "secret"}))?;
    store.update_rows(TABLE, &secret, Some(&every_row), 4)?;

    let below_ten = |row: &Record| row["no"].as_i64().is_some_and(|no| no < 10);
    for row in store.select_rows(TABLE, None, Some(&below_ten), -1)? {
        writeln!(out, "{}", serde_json::to_string(&row)?)?;
    }

    store.truncate_table(TABLE)?;
    Ok(())
}
