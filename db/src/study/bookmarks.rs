use chrono::Utc;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{Book, Bookmark, BookmarkDetail, Chapter, Verse, VerseInContext};
use crate::schema::{bookmarks, books, chapters, verses};
use crate::{DbConnection, DbError};

/// Color used when the client doesn't pick one.
pub const DEFAULT_COLOR: &str = "yellow";

/// Fields a user supplies when bookmarking a verse.
#[derive(Clone, Debug, Default)]
pub struct NewBookmark<'a> {
    pub verse_id: i32,
    pub color: Option<&'a str>,
    pub note: Option<&'a str>,
}

type Row = (Bookmark, (Verse, (Chapter, Book)));

fn detail((bookmark, located): Row) -> BookmarkDetail {
    BookmarkDetail {
        bookmark,
        verse: VerseInContext::from(located),
    }
}

/// Lists a user's bookmarks, newest first, each with its verse, chapter
/// and book. Bookmarks created at the same instant keep insertion order.
pub fn list(user_id: &str, conn: &mut DbConnection) -> Result<Vec<BookmarkDetail>, DbError> {
    let rows = bookmarks::table
        .inner_join(verses::table.inner_join(chapters::table.inner_join(books::table)))
        .filter(bookmarks::user_id.eq(user_id))
        .order_by((
            bookmarks::created_at.desc(),
            sql::<BigInt>("bookmarks.rowid").desc(),
        ))
        .load::<Row>(conn)?;

    Ok(rows.into_iter().map(detail).collect())
}

/// Bookmarks a verse for a user.
pub fn create(
    user_id: &str,
    new: NewBookmark,
    conn: &mut DbConnection,
) -> Result<BookmarkDetail, DbError> {
    conn.transaction::<_, DbError, _>(|conn| {
        let exists = verses::table
            .find(new.verse_id)
            .select(verses::id)
            .first::<i32>(conn)
            .optional()?
            .is_some();
        if !exists {
            return Err(DbError::VerseNotFound { id: new.verse_id });
        }

        let bookmark = Bookmark {
            id: super::new_id(),
            user_id: user_id.to_string(),
            verse_id: new.verse_id,
            color: new
                .color
                .filter(|c| !c.is_empty())
                .unwrap_or(DEFAULT_COLOR)
                .to_string(),
            note: new.note.map(str::to_string),
            created_at: Utc::now().naive_utc(),
        };
        diesel::insert_into(bookmarks::table)
            .values(&bookmark)
            .execute(conn)?;

        let row = bookmarks::table
            .inner_join(verses::table.inner_join(chapters::table.inner_join(books::table)))
            .filter(bookmarks::id.eq(&bookmark.id))
            .first::<Row>(conn)?;
        Ok(detail(row))
    })
}

/// Deletes a bookmark if it belongs to the user.
pub fn delete(user_id: &str, id: &str, conn: &mut DbConnection) -> Result<(), DbError> {
    let deleted = diesel::delete(
        bookmarks::table
            .filter(bookmarks::id.eq(id))
            .filter(bookmarks::user_id.eq(user_id)),
    )
    .execute(conn)?;

    match deleted {
        0 => Err(DbError::NotFound {
            kind: "bookmark",
            id: id.to_string(),
        }),
        _ => Ok(()),
    }
}
