use diesel::prelude::*;

use crate::models::*;
use crate::{DbConnection, DbError};

/// Max number of search results returned from the database.
pub const SEARCH_RESULT_LIMIT: i64 = 50;

/// Trait implemented by types that can query the read-only Bible catalog.
pub trait Catalog {
    /// Gets every imported Bible version, ordered by name.
    fn versions(conn: &mut DbConnection) -> Result<Vec<BibleVersion>, DbError>;

    /// Gets all books in the Bible in canonical order.
    fn books(conn: &mut DbConnection) -> Result<Vec<Book>, DbError>;

    /// Looks up a chapter by book id and chapter number, along with its
    /// verses in the given version ordered by verse number.
    ///
    /// Verses of other versions sharing the chapter are never returned.
    fn chapter(
        book_id: &str,
        number: i32,
        version_id: &str,
        conn: &mut DbConnection,
    ) -> Result<(Chapter, Vec<Verse>), DbError>;

    /// Searches verse text of one version for the given substring.
    ///
    /// `%` and `_` in the query match literally. Case is ignored for ASCII
    /// letters only, as SQLite's `LIKE` does. A blank query returns no
    /// results instead of the whole Bible. At most
    /// [SEARCH_RESULT_LIMIT](crate::catalog::SEARCH_RESULT_LIMIT) verses are
    /// returned, in canonical order.
    fn search(
        query: &str,
        version_id: &str,
        conn: &mut DbConnection,
    ) -> Result<Vec<VerseInContext>, DbError>;
}

/// Main implementation for the [Catalog](crate::catalog::Catalog) trait.
pub struct DbCatalog;

impl Catalog for DbCatalog {
    fn versions(conn: &mut DbConnection) -> Result<Vec<BibleVersion>, DbError> {
        use crate::schema::bible_versions::dsl::*;

        bible_versions
            .order_by(name.asc())
            .load(conn)
            .map_err(DbError::from)
    }

    fn books(conn: &mut DbConnection) -> Result<Vec<Book>, DbError> {
        use crate::schema::books::dsl::*;

        books
            .order_by(canonical_order.asc())
            .load(conn)
            .map_err(DbError::from)
    }

    fn chapter(
        book_id: &str,
        number: i32,
        version_id: &str,
        conn: &mut DbConnection,
    ) -> Result<(Chapter, Vec<Verse>), DbError> {
        use crate::schema::{chapters, verses};

        let chapter = chapters::table
            .filter(chapters::book_id.eq(book_id))
            .filter(chapters::number.eq(number))
            .first::<Chapter>(conn)
            .optional()?
            .ok_or_else(|| DbError::ChapterNotFound {
                book: book_id.to_owned(),
                chapter: number,
            })?;

        let verses = verses::table
            .filter(verses::chapter_id.eq(chapter.id))
            .filter(verses::bible_version_id.eq(version_id))
            .order_by(verses::number.asc())
            .load::<Verse>(conn)?;

        Ok((chapter, verses))
    }

    fn search(
        query: &str,
        version_id: &str,
        conn: &mut DbConnection,
    ) -> Result<Vec<VerseInContext>, DbError> {
        use crate::schema::{books, chapters, verses};

        let query = query.trim();

        // Don't even try to run the query if there are no characters
        if query.is_empty() {
            return Ok(vec![]);
        }

        let rows = verses::table
            .inner_join(chapters::table.inner_join(books::table))
            .filter(verses::bible_version_id.eq(version_id))
            .filter(verses::text.like(format!("%{}%", escape_like(query))).escape('\\'))
            .order_by((
                books::canonical_order.asc(),
                chapters::number.asc(),
                verses::number.asc(),
            ))
            .limit(SEARCH_RESULT_LIMIT)
            .load::<(Verse, (Chapter, Book))>(conn)?;

        Ok(rows.into_iter().map(VerseInContext::from).collect())
    }
}

/// Escapes the LIKE wildcards so user input only matches literally.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
