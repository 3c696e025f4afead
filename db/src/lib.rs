#[macro_use]
extern crate diesel;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use thiserror::Error;

/// Type of a pooled SQLite connection manager.
pub type SqliteConnectionManager = r2d2::ConnectionManager<SqliteConnection>;

/// Type for a SQLite connection pool.
pub type SqliteConnectionPool = r2d2::Pool<SqliteConnectionManager>;

/// A connection checked out of the pool.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

pub type DbConnection = SqliteConnection;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Clone, Error, Debug, PartialEq)]
pub enum DbError {
    #[error("Chapter {} of '{}' was not found.", chapter, book)]
    ChapterNotFound { book: String, chapter: i32 },

    #[error("Verse {} was not found.", id)]
    VerseNotFound { id: i32 },

    #[error("The {} '{}' was not found.", kind, id)]
    NotFound { kind: &'static str, id: String },

    #[error("'{}' is not a valid Bible reference.", reference)]
    InvalidReference { reference: String },

    #[error("There was a connection pool error. Root cause: {:?}.", cause)]
    ConnectionPool { cause: String },

    #[error("There was a database migration error. Root cause: {:?}.", cause)]
    Migration { cause: String },

    #[error("The Bible dataset could not be read. Root cause: {:?}.", cause)]
    Dataset { cause: String },

    #[error("There was a database error. Root cause: {:?}.", cause)]
    Other { cause: String },
}

impl From<diesel::result::Error> for DbError {
    fn from(e: diesel::result::Error) -> Self {
        DbError::Other {
            cause: e.to_string(),
        }
    }
}

impl From<r2d2::PoolError> for DbError {
    fn from(e: r2d2::PoolError) -> Self {
        DbError::ConnectionPool {
            cause: e.to_string(),
        }
    }
}

/// Turns on the pragmas every connection needs: foreign key enforcement
/// and a busy timeout so writers wait on each other instead of failing.
#[derive(Debug)]
struct ConnectionPragmas;

impl r2d2::CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionPragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        apply_pragmas(conn).map_err(r2d2::Error::QueryError)
    }
}

fn apply_pragmas(conn: &mut SqliteConnection) -> QueryResult<()> {
    conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
}

/// Builds a SQLite connection pool with the given URL.
///
/// An in-memory database only exists for the connection that opened it,
/// so `:memory:` pools hold exactly one connection.
pub fn build_pool(db_url: &str) -> Result<SqliteConnectionPool, DbError> {
    let max_size = if db_url == ":memory:" { 1 } else { 15 };
    r2d2::Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(ConnectionPragmas))
        .build(SqliteConnectionManager::new(db_url))
        .map_err(|e| DbError::ConnectionPool {
            cause: e.to_string(),
        })
}

/// Establishes a non-pooled SQLite connection.
pub fn establish_connection(db_url: &str) -> Result<SqliteConnection, DbError> {
    let mut conn = SqliteConnection::establish(db_url).map_err(|e| DbError::ConnectionPool {
        cause: format!("Error connecting to {}: {}", db_url, e),
    })?;
    apply_pragmas(&mut conn)?;
    Ok(conn)
}

/// Run any pending Diesel migrations.
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<(), DbError> {
    conn.run_pending_migrations(MIGRATIONS)
        .map(|_| ())
        .map_err(|e| DbError::Migration {
            cause: e.to_string(),
        })
}

pub mod canon;
pub mod catalog;
pub mod import;
pub mod models;
mod schema;
pub mod study;

pub use catalog::{Catalog, DbCatalog};

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::import::{import_version, SourceBook, VersionSource};

    /// A migrated in-memory database.
    pub fn connection() -> SqliteConnection {
        let mut conn = establish_connection(":memory:").unwrap();
        run_migrations(&mut conn).unwrap();
        conn
    }

    pub fn source_book(abbrev: &str, chapters: &[&[&str]]) -> SourceBook {
        SourceBook {
            abbrev: abbrev.to_string(),
            chapters: chapters
                .iter()
                .map(|verses| verses.iter().map(|v| v.to_string()).collect())
                .collect(),
        }
    }

    fn psalm_23() -> SourceBook {
        let mut chapters = vec![Vec::new(); 22];
        chapters.push(vec![
            "O Senhor é o meu pastor; de nada terei falta.".to_string(),
        ]);
        SourceBook {
            abbrev: "sl".to_string(),
            chapters,
        }
    }

    /// Imports a small two-version fixture: John 1 and 3, Psalm 23.
    pub fn seeded_connection() -> SqliteConnection {
        let mut conn = connection();
        let nvi = vec![
            source_book(
                "jo",
                &[
                    &[
                        "No princípio era aquele que é a Palavra.",
                        "Ele estava com Deus no princípio.",
                    ],
                    &[],
                    &[
                        "Havia um fariseu chamado Nicodemos.",
                        "Ele veio a Jesus, à noite.",
                        "Em resposta, Jesus declarou.",
                    ],
                ],
            ),
            psalm_23(),
        ];
        let acf = vec![source_book(
            "jo",
            &[&["No princípio era o Verbo, e o Verbo estava com Deus."]],
        )];
        import_version(VersionSource::find("nvi").unwrap(), &nvi, &mut conn).unwrap();
        import_version(VersionSource::find("acf").unwrap(), &acf, &mut conn).unwrap();
        conn
    }
}
