//! SQLite implementation of the remote store contract.
//!
//! # Responsibility
//! - Translate `Query`/`Filter` descriptions into parameterized SQL.
//! - Assign ids and timestamp defaults the way the hosted backend does.
//! - Publish change events for every row a write touches.
//!
//! # Invariants
//! - Table names come from `Table`; column names are checked against the
//!   table catalog before they reach SQL text.
//! - Ordering ties fall back to insertion order in the requested direction.

use super::channel::{ChangeKind, ChannelRegistry, ChannelSpec, Subscription};
use super::query::{Direction, Filter, Query, Table};
use super::{RemoteError, RemoteResult, RemoteStore, Row};
use crate::db::{open_db, open_db_in_memory};
use log::debug;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection};
use serde_json::{Number, Value};
use std::cell::RefCell;
use std::path::Path;
use uuid::Uuid;

const NOW_MS_SQL: &str = "(CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER))";

/// Remote store backed by one SQLite connection.
pub struct SqliteRemoteStore {
    conn: Connection,
    channels: RefCell<ChannelRegistry>,
}

impl SqliteRemoteStore {
    /// Wraps a connection that already has the schema applied.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            channels: RefCell::new(ChannelRegistry::new()),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> RemoteResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> RemoteResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Number of channels still registered (closed ones are pruned lazily).
    pub fn channel_count(&self) -> usize {
        self.channels.borrow().len()
    }

    fn run(&self, sql: &str, binds: Vec<SqlValue>) -> RemoteResult<Vec<Row>> {
        let mut stmt = self.conn.prepare(sql)?;
        let names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Row::new();
            for (index, name) in names.iter().enumerate() {
                let value = sql_to_json(name, row.get_ref(index)?)?;
                record.insert(name.clone(), value);
            }
            out.push(record);
        }
        Ok(out)
    }

    fn publish(&self, table: Table, kind: ChangeKind, rows: &[Row], op: &str) {
        let delivered = self.channels.borrow_mut().publish(table, kind, rows);
        debug!(
            "event=remote_write module=remote status=ok op={op} table={table} rows={} events={delivered}",
            rows.len()
        );
    }
}

impl RemoteStore for SqliteRemoteStore {
    fn select(&self, query: &Query) -> RemoteResult<Vec<Row>> {
        let table = query.table;
        let mut binds = Vec::new();
        let mut sql = format!("SELECT {} FROM {}", column_list(table), table.name());
        sql.push_str(&where_clause(table, &query.filters, &mut binds)?);

        match query.order {
            Some(order) => {
                check_column(table, order.column)?;
                let direction = match order.direction {
                    Direction::Ascending => "ASC",
                    Direction::Descending => "DESC",
                };
                sql.push_str(&format!(
                    " ORDER BY {} {direction}, rowid {direction}",
                    order.column
                ));
            }
            None => sql.push_str(" ORDER BY rowid ASC"),
        }

        self.run(&sql, binds)
    }

    fn insert(&self, table: Table, mut row: Row) -> RemoteResult<Row> {
        if !row.contains_key("id") {
            row.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        }

        let mut columns = Vec::with_capacity(row.len());
        let mut binds = Vec::with_capacity(row.len());
        for (column, value) in &row {
            check_column(table, column)?;
            columns.push(column.as_str());
            binds.push(json_to_sql(column, value)?);
        }
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders}) RETURNING {}",
            table.name(),
            columns.join(", "),
            column_list(table)
        );

        let inserted = self
            .run(&sql, binds)?
            .into_iter()
            .next()
            .ok_or_else(|| RemoteError::InvalidData(format!("insert into {table} returned no row")))?;
        self.publish(table, ChangeKind::Insert, std::slice::from_ref(&inserted), "insert");
        Ok(inserted)
    }

    fn update(&self, table: Table, patch: Row, filters: &[Filter]) -> RemoteResult<Vec<Row>> {
        if filters.is_empty() {
            return Err(RemoteError::MissingFilter(table));
        }
        if patch.is_empty() {
            return Err(RemoteError::InvalidData(format!(
                "update on {table} has no columns"
            )));
        }

        let mut assignments = Vec::with_capacity(patch.len() + 1);
        let mut binds = Vec::with_capacity(patch.len());
        for (column, value) in &patch {
            check_column(table, column)?;
            assignments.push(format!("{column} = ?"));
            binds.push(json_to_sql(column, value)?);
        }
        if table.has_column("updated_at") && !patch.contains_key("updated_at") {
            assignments.push(format!("updated_at = {NOW_MS_SQL}"));
        }

        let mut sql = format!("UPDATE {} SET {}", table.name(), assignments.join(", "));
        sql.push_str(&where_clause(table, filters, &mut binds)?);
        sql.push_str(&format!(" RETURNING {}", column_list(table)));

        let updated = self.run(&sql, binds)?;
        self.publish(table, ChangeKind::Update, &updated, "update");
        Ok(updated)
    }

    fn delete(&self, table: Table, filters: &[Filter]) -> RemoteResult<Vec<Row>> {
        if filters.is_empty() {
            return Err(RemoteError::MissingFilter(table));
        }

        let mut binds = Vec::new();
        let mut sql = format!("DELETE FROM {}", table.name());
        sql.push_str(&where_clause(table, filters, &mut binds)?);
        sql.push_str(&format!(" RETURNING {}", column_list(table)));

        let deleted = self.run(&sql, binds)?;
        self.publish(table, ChangeKind::Delete, &deleted, "delete");
        Ok(deleted)
    }

    fn subscribe(&self, spec: ChannelSpec) -> RemoteResult<Subscription> {
        if let Some((column, _)) = &spec.filter {
            check_column(spec.table, column)?;
        }
        debug!(
            "event=channel_open module=remote status=ok table={} filtered={}",
            spec.table,
            spec.filter.is_some()
        );
        Ok(self.channels.borrow_mut().open(spec))
    }
}

fn column_list(table: Table) -> String {
    table.columns().join(", ")
}

fn check_column(table: Table, column: &str) -> RemoteResult<()> {
    if table.has_column(column) {
        return Ok(());
    }
    Err(RemoteError::UnknownColumn {
        table,
        column: column.to_string(),
    })
}

fn where_clause(
    table: Table,
    filters: &[Filter],
    binds: &mut Vec<SqlValue>,
) -> RemoteResult<String> {
    let mut clauses = Vec::with_capacity(filters.len());
    for filter in filters {
        let column = filter.column();
        check_column(table, column)?;
        match filter {
            Filter::Eq(_, Value::Null) => clauses.push(format!("{column} IS NULL")),
            Filter::Neq(_, Value::Null) => clauses.push(format!("{column} IS NOT NULL")),
            Filter::Eq(_, value) => {
                clauses.push(format!("{column} = ?"));
                binds.push(json_to_sql(column, value)?);
            }
            Filter::Neq(_, value) => {
                clauses.push(format!("{column} <> ?"));
                binds.push(json_to_sql(column, value)?);
            }
            Filter::In(_, values) if values.is_empty() => clauses.push("0 = 1".to_string()),
            Filter::In(_, values) => {
                let placeholders = vec!["?"; values.len()].join(", ");
                clauses.push(format!("{column} IN ({placeholders})"));
                for value in values {
                    binds.push(json_to_sql(column, value)?);
                }
            }
        }
    }

    if clauses.is_empty() {
        return Ok(String::new());
    }
    Ok(format!(" WHERE {}", clauses.join(" AND ")))
}

fn json_to_sql(column: &str, value: &Value) -> RemoteResult<SqlValue> {
    match value {
        Value::Null => Ok(SqlValue::Null),
        Value::Bool(flag) => Ok(SqlValue::Integer(i64::from(*flag))),
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                Ok(SqlValue::Integer(integer))
            } else if let Some(real) = number.as_f64() {
                Ok(SqlValue::Real(real))
            } else {
                Err(RemoteError::UnsupportedValue {
                    column: column.to_string(),
                    detail: format!("number `{number}` is out of range"),
                })
            }
        }
        Value::String(text) => Ok(SqlValue::Text(text.clone())),
        Value::Array(_) | Value::Object(_) => Err(RemoteError::UnsupportedValue {
            column: column.to_string(),
            detail: "nested values are not stored".to_string(),
        }),
    }
}

fn sql_to_json(column: &str, value: ValueRef<'_>) -> RemoteResult<Value> {
    match value {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Integer(integer) => Ok(Value::from(integer)),
        ValueRef::Real(real) => Number::from_f64(real).map(Value::Number).ok_or_else(|| {
            RemoteError::InvalidData(format!("non-finite real in column `{column}`"))
        }),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|text| Value::String(text.to_string()))
            .map_err(|_| RemoteError::InvalidData(format!("non-utf8 text in column `{column}`"))),
        ValueRef::Blob(_) => Err(RemoteError::InvalidData(format!(
            "blob value in column `{column}`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteRemoteStore;
    use crate::remote::{
        eq_filter, ChannelSpec, Direction, Query, RemoteError, RemoteStore, Row, Table,
    };
    use serde_json::{json, Value};

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    fn team(store: &SqliteRemoteStore, name: &str) -> String {
        let inserted = store
            .insert(Table::Teams, row(json!({ "name": name })))
            .unwrap();
        inserted["id"].as_str().unwrap().to_string()
    }

    #[test]
    fn insert_assigns_id_and_timestamps() {
        let store = SqliteRemoteStore::open_in_memory().unwrap();
        let inserted = store
            .insert(Table::Teams, row(json!({ "name": "core" })))
            .unwrap();

        assert!(uuid::Uuid::parse_str(inserted["id"].as_str().unwrap()).is_ok());
        assert!(inserted["created_at"].as_i64().unwrap() > 0);
        assert_eq!(inserted["created_by"], Value::Null);
    }

    #[test]
    fn select_orders_ties_by_insertion_order() {
        let store = SqliteRemoteStore::open_in_memory().unwrap();
        let first = team(&store, "first");
        let second = team(&store, "second");

        let ascending = store
            .select(&Query::table(Table::Teams).order_by("created_at", Direction::Ascending))
            .unwrap();
        assert_eq!(ascending[0]["id"], json!(first));
        assert_eq!(ascending[1]["id"], json!(second));

        let descending = store
            .select(&Query::table(Table::Teams).order_by("created_at", Direction::Descending))
            .unwrap();
        assert_eq!(descending[0]["id"], json!(second));
    }

    #[test]
    fn in_filter_with_no_values_matches_nothing() {
        let store = SqliteRemoteStore::open_in_memory().unwrap();
        team(&store, "solo");
        let rows = store
            .select(&Query::table(Table::Teams).is_in("id", Vec::<String>::new()))
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn unknown_columns_are_rejected() {
        let store = SqliteRemoteStore::open_in_memory().unwrap();
        let err = store
            .select(&Query::table(Table::Teams).eq("name; DROP TABLE teams", "x"))
            .unwrap_err();
        assert!(matches!(err, RemoteError::UnknownColumn { .. }));

        let err = store
            .insert(Table::Teams, row(json!({ "name": "x", "color": "red" })))
            .unwrap_err();
        assert!(matches!(err, RemoteError::UnknownColumn { .. }));
    }

    #[test]
    fn update_requires_filter_and_bumps_updated_at() {
        let store = SqliteRemoteStore::open_in_memory().unwrap();
        let owner = uuid::Uuid::new_v4().to_string();
        let project = store
            .insert(
                Table::Projects,
                row(json!({ "name": "alpha", "owner_id": owner, "updated_at": 1 })),
            )
            .unwrap();

        let err = store
            .update(Table::Projects, row(json!({ "status": "completed" })), &[])
            .unwrap_err();
        assert!(matches!(err, RemoteError::MissingFilter(Table::Projects)));

        let updated = store
            .update(
                Table::Projects,
                row(json!({ "status": "completed" })),
                &eq_filter("id", project["id"].clone()),
            )
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0]["status"], json!("completed"));
        assert!(updated[0]["updated_at"].as_i64().unwrap() > 1);
    }

    #[test]
    fn writes_notify_matching_channels() {
        let store = SqliteRemoteStore::open_in_memory().unwrap();
        let team_a = team(&store, "a");
        let team_b = team(&store, "b");
        let sub = store
            .subscribe(ChannelSpec::table(Table::Messages).filter_eq("team_id", team_a.clone()))
            .unwrap();
        let sender = uuid::Uuid::new_v4().to_string();

        store
            .insert(
                Table::Messages,
                row(json!({ "content": "hi", "sender_id": sender, "team_id": team_b })),
            )
            .unwrap();
        let inserted = store
            .insert(
                Table::Messages,
                row(json!({ "content": "hey", "sender_id": sender, "team_id": team_a })),
            )
            .unwrap();
        store
            .delete(Table::Messages, &eq_filter("id", inserted["id"].clone()))
            .unwrap();

        assert_eq!(sub.drain().len(), 2);
    }

    #[test]
    fn constraint_violations_are_rejections() {
        let store = SqliteRemoteStore::open_in_memory().unwrap();
        let someone = uuid::Uuid::new_v4().to_string();
        let err = store
            .insert(
                Table::Ratings,
                row(json!({ "rater_id": someone, "rated_user_id": someone, "rating": 9 })),
            )
            .unwrap_err();
        assert!(matches!(err, RemoteError::Rejected(_)));

        let team_id = team(&store, "core");
        let member = row(json!({ "team_id": team_id, "user_id": someone }));
        store.insert(Table::TeamMembers, member.clone()).unwrap();
        let err = store.insert(Table::TeamMembers, member).unwrap_err();
        match err {
            RemoteError::Rejected(message) => assert!(message.contains("UNIQUE")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_sql_is_not_a_rejection() {
        let store = SqliteRemoteStore::open_in_memory().unwrap();
        let err = RemoteError::from(
            store
                .connection()
                .execute_batch("SELEC nothing")
                .unwrap_err(),
        );
        assert!(matches!(err, RemoteError::Sqlite(_)));
    }
}
