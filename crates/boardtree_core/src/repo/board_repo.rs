//! Board store adapter contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence APIs for the board forest.
//! - Keep SQL details and ordering behavior inside the repository boundary.
//!
//! # Invariants
//! - `list_all` returns true creation order: `created_at ASC, rowid ASC`
//!   (same-millisecond inserts tiebreak on insertion order, not on the
//!   random id).
//! - Deleting a board cascades to its whole subtree (schema foreign key;
//!   requires `foreign_keys=ON`, which connection bootstrap guarantees).
//! - Timestamps are written by SQLite, never by callers.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::board::{Board, BoardId};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Result type used by board repository operations.
pub type BoardRepoResult<T> = Result<T, BoardRepoError>;

/// Errors from board repository operations.
#[derive(Debug)]
pub enum BoardRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target board does not exist.
    BoardNotFound(BoardId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for BoardRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::BoardNotFound(id) => write!(f, "board not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "board repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "board repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "board repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid board data: {message}"),
        }
    }
}

impl Error for BoardRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for BoardRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for BoardRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Store adapter interface for the board forest.
pub trait BoardRepository {
    /// Inserts one board and returns the stored row.
    fn insert(&self, name: &str, parent_id: Option<BoardId>) -> BoardRepoResult<Board>;
    /// Deletes one board; the schema cascades to its subtree.
    fn remove(&self, id: BoardId) -> BoardRepoResult<()>;
    /// Rewrites one board's parent and refreshes `updated_at`.
    fn set_parent(&self, id: BoardId, parent_id: Option<BoardId>) -> BoardRepoResult<Board>;
    /// Loads one board by id.
    fn get_by_id(&self, id: BoardId) -> BoardRepoResult<Option<Board>>;
    /// Lists every board in creation order.
    fn list_all(&self) -> BoardRepoResult<Vec<Board>>;
}

/// SQLite-backed board repository.
pub struct SqliteBoardRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBoardRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> BoardRepoResult<Self> {
        ensure_boards_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl BoardRepository for SqliteBoardRepository<'_> {
    fn insert(&self, name: &str, parent_id: Option<BoardId>) -> BoardRepoResult<Board> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO boards (id, name, parent_id)
             VALUES (?1, ?2, ?3);",
            params![
                id.to_string(),
                name,
                parent_id.map(|value| value.to_string()),
            ],
        )?;
        load_required_board(self.conn, id)
    }

    fn remove(&self, id: BoardId) -> BoardRepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM boards WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(BoardRepoError::BoardNotFound(id));
        }
        Ok(())
    }

    fn set_parent(&self, id: BoardId, parent_id: Option<BoardId>) -> BoardRepoResult<Board> {
        let changed = self.conn.execute(
            "UPDATE boards
             SET parent_id = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), parent_id.map(|value| value.to_string())],
        )?;
        if changed == 0 {
            return Err(BoardRepoError::BoardNotFound(id));
        }
        load_required_board(self.conn, id)
    }

    fn get_by_id(&self, id: BoardId) -> BoardRepoResult<Option<Board>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, parent_id, created_at, updated_at
             FROM boards
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_board_row(row)?));
        }
        Ok(None)
    }

    fn list_all(&self) -> BoardRepoResult<Vec<Board>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, parent_id, created_at, updated_at
             FROM boards
             ORDER BY created_at ASC, rowid ASC;",
        )?;
        let mut rows = stmt.query([])?;

        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_board_row(row)?);
        }
        Ok(items)
    }
}

fn load_required_board(conn: &Connection, id: BoardId) -> BoardRepoResult<Board> {
    let mut stmt = conn.prepare(
        "SELECT id, name, parent_id, created_at, updated_at
         FROM boards
         WHERE id = ?1;",
    )?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_board_row(row);
    }
    Err(BoardRepoError::BoardNotFound(id))
}

fn parse_board_row(row: &Row<'_>) -> BoardRepoResult<Board> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "boards.id")?;

    let parent_id = row
        .get::<_, Option<String>>("parent_id")?
        .map(|value| parse_uuid(&value, "boards.parent_id"))
        .transpose()?;

    Ok(Board {
        id,
        name: row.get("name")?,
        parent_id,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_uuid(value: &str, column: &'static str) -> BoardRepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| BoardRepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn ensure_boards_connection_ready(conn: &Connection) -> BoardRepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(BoardRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "boards")? {
        return Err(BoardRepoError::MissingRequiredTable("boards"));
    }

    for column in ["id", "name", "parent_id", "created_at", "updated_at"] {
        if !table_has_column(conn, "boards", column)? {
            return Err(BoardRepoError::MissingRequiredColumn {
                table: "boards",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> BoardRepoResult<bool> {
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

fn table_has_column(conn: &Connection, table: &str, column: &str) -> BoardRepoResult<bool> {
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
