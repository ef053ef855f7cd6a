//! SQLite implementation of the repository contracts.
//!
//! # Responsibility
//! - Keep SQL, row parsing and staging details behind `Repository<E>`.
//! - Provide `SqliteUnitOfWork`, the transactional boundary.
//!
//! # Invariants
//! - Staged writes are applied only inside the unit-of-work transaction.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::cancel::CancellationToken;
use crate::model::EntityId;
use crate::repo::{Entity, RepoError, RepoResult, Repository};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use uuid::Uuid;

mod groups;
mod people;
mod scheduling;
mod unit_of_work;

pub use unit_of_work::SqliteUnitOfWork;

/// Storage mapping of one entity type.
pub(crate) trait SqlEntity: Entity {
    const TABLE: &'static str;
    /// Columns required by `insert`, `update` and `load`.
    const COLUMNS: &'static [&'static str];

    fn insert(&self, conn: &Connection) -> rusqlite::Result<usize>;
    fn update(&self, conn: &Connection) -> rusqlite::Result<usize>;
    fn load(
        conn: &Connection,
        filter: &Self::Filter,
        include: Self::Include,
    ) -> RepoResult<Vec<Self>>;
}

enum Staged<E> {
    Create(E),
    Update(E),
    Delete(EntityId),
}

/// Generic staging repository over one table.
pub(crate) struct SqliteRepository<'conn, E: SqlEntity> {
    conn: &'conn Connection,
    staged: Vec<Staged<E>>,
}

impl<'conn, E: SqlEntity> SqliteRepository<'conn, E> {
    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            staged: Vec::new(),
        }
    }

    pub(crate) fn apply_creates(
        &self,
        conn: &Connection,
        cancel: &CancellationToken,
    ) -> RepoResult<usize> {
        let mut affected = 0;
        for change in &self.staged {
            if let Staged::Create(entity) = change {
                cancel.check()?;
                affected += entity.insert(conn)?;
            }
        }
        Ok(affected)
    }

    pub(crate) fn apply_updates(
        &self,
        conn: &Connection,
        cancel: &CancellationToken,
    ) -> RepoResult<usize> {
        let mut affected = 0;
        for change in &self.staged {
            if let Staged::Update(entity) = change {
                cancel.check()?;
                affected += entity.update(conn)?;
            }
        }
        Ok(affected)
    }

    pub(crate) fn apply_deletes(
        &self,
        conn: &Connection,
        cancel: &CancellationToken,
    ) -> RepoResult<usize> {
        let sql = format!("DELETE FROM {} WHERE id = ?1;", E::TABLE);
        let mut affected = 0;
        for change in &self.staged {
            if let Staged::Delete(id) = change {
                cancel.check()?;
                affected += conn.execute(&sql, [id.to_string()])?;
            }
        }
        Ok(affected)
    }
}

impl<E: SqlEntity> Repository<E> for SqliteRepository<'_, E> {
    fn find_by(&self, filter: &E::Filter, include: E::Include) -> RepoResult<Vec<E>> {
        E::load(self.conn, filter, include)
    }

    fn create(&mut self, entity: E) -> RepoResult<()> {
        entity.check_invariants()?;
        self.staged.push(Staged::Create(entity));
        Ok(())
    }

    fn update(&mut self, entity: E) -> RepoResult<()> {
        entity.check_invariants()?;
        self.staged.push(Staged::Update(entity));
        Ok(())
    }

    fn delete(&mut self, entity: &E) {
        self.staged.push(Staged::Delete(entity.id()));
    }

    fn pending(&self) -> usize {
        self.staged.len()
    }

    fn discard(&mut self) {
        self.staged.clear();
    }
}

/// Incremental `SELECT ... WHERE 1 = 1 AND ...` builder with bound values.
pub(crate) struct SelectBuilder {
    sql: String,
    bind_values: Vec<Value>,
}

impl SelectBuilder {
    pub(crate) fn new(select_sql: &str) -> Self {
        Self {
            sql: format!("{select_sql} WHERE 1 = 1"),
            bind_values: Vec::new(),
        }
    }

    pub(crate) fn eq_uuid(&mut self, column: &str, value: Option<Uuid>) -> &mut Self {
        if let Some(value) = value {
            self.sql.push_str(&format!(" AND {column} = ?"));
            self.bind_values.push(Value::Text(value.to_string()));
        }
        self
    }

    pub(crate) fn eq_text(&mut self, column: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.sql.push_str(&format!(" AND {column} = ?"));
            self.bind_values.push(Value::Text(value.to_string()));
        }
        self
    }

    /// Appends a raw condition with exactly one `?` placeholder.
    pub(crate) fn condition(&mut self, clause: &str, value: Option<Uuid>) -> &mut Self {
        if let Some(value) = value {
            self.sql.push_str(" AND ");
            self.sql.push_str(clause);
            self.bind_values.push(Value::Text(value.to_string()));
        }
        self
    }

    pub(crate) fn order_by(&mut self, clause: &str) -> &mut Self {
        self.sql.push_str(" ORDER BY ");
        self.sql.push_str(clause);
        self
    }

    pub(crate) fn fetch<T>(
        &self,
        conn: &Connection,
        parse: impl Fn(&Row<'_>) -> RepoResult<T>,
    ) -> RepoResult<Vec<T>> {
        let mut stmt = conn.prepare(&self.sql)?;
        let mut rows = stmt.query(params_from_iter(self.bind_values.iter()))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse(row)?);
        }
        Ok(items)
    }
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn get_uuid(row: &Row<'_>, column: &'static str) -> RepoResult<Uuid> {
    let value: String = row.get(column)?;
    parse_uuid(&value, column)
}

pub(crate) fn get_optional_uuid(row: &Row<'_>, column: &'static str) -> RepoResult<Option<Uuid>> {
    row.get::<_, Option<String>>(column)?
        .map(|value| parse_uuid(&value, column))
        .transpose()
}

pub(crate) fn get_u8(row: &Row<'_>, column: &'static str) -> RepoResult<u8> {
    let value: i64 = row.get(column)?;
    u8::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("value `{value}` out of byte range in {column}")))
}

pub(crate) fn optional_uuid_text(value: Option<Uuid>) -> Option<String> {
    value.map(|value| value.to_string())
}

/// Verifies that the table backing `E` exists with every mapped column.
pub(crate) fn ensure_entity_table<E: SqlEntity>(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, E::TABLE)? {
        return Err(RepoError::MissingRequiredTable(E::TABLE));
    }
    for &column in E::COLUMNS {
        if !table_has_column(conn, E::TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: E::TABLE,
                column,
            });
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
