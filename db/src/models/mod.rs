use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;
use diesel::{Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::schema::{bible_versions, books, chapters, verses};

/// A named rendering of the Bible text (e.g. NVI, ACF).
#[derive(Clone, Debug, Deserialize, Insertable, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = bible_versions)]
pub struct BibleVersion {
    pub id: String,
    pub name: String,
    pub abbreviation: String,
    pub language: String,
    pub description: Option<String>,
}

/// Enum for the testaments in the Bible (Old or New). This is mapped
/// to the `testament` column of the `books` table as `AT` or `NT`.
#[derive(AsExpression, Clone, Copy, Debug, Deserialize, Eq, FromSqlRow, PartialEq, Serialize)]
#[diesel(sql_type = Text)]
pub enum Testament {
    #[serde(rename = "AT")]
    Old,
    #[serde(rename = "NT")]
    New,
}

impl Testament {
    pub fn code(self) -> &'static str {
        match self {
            Testament::Old => "AT",
            Testament::New => "NT",
        }
    }
}

impl FromSql<Text, Sqlite> for Testament {
    fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let testament = <String as FromSql<Text, Sqlite>>::from_sql(bytes)?;
        match testament.as_ref() {
            "AT" => Ok(Testament::Old),
            "NT" => Ok(Testament::New),
            other => Err(format!("Unexpected testament '{}' in the Bible", other).into()),
        }
    }
}

impl ToSql<Text, Sqlite> for Testament {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.code());
        Ok(IsNull::No)
    }
}

/// Model representing a book in the Bible.
#[derive(Clone, Debug, Deserialize, Insertable, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = books)]
pub struct Book {
    pub id: String,
    pub name: String,
    pub testament: Testament,
    pub chapters: i32,
    #[serde(rename = "order")]
    pub canonical_order: i32,
}

/// Model representing a chapter of a book. Chapters are shared by every
/// version; verses carry the version.
#[derive(Clone, Debug, Deserialize, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = chapters)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: i32,
    pub book_id: String,
    pub number: i32,
}

/// Model representing a Bible verse in one version.
#[derive(Clone, Debug, Deserialize, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = verses)]
#[serde(rename_all = "camelCase")]
pub struct Verse {
    pub id: i32,
    pub chapter_id: i32,
    pub number: i32,
    pub text: String,
    pub bible_version_id: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = verses)]
pub(crate) struct NewVerse<'a> {
    pub chapter_id: i32,
    pub number: i32,
    pub text: &'a str,
    pub bible_version_id: &'a str,
}

/// A chapter together with the book it belongs to.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ChapterWithBook {
    #[serde(flatten)]
    pub chapter: Chapter,
    pub book: Book,
}

/// A verse located in its chapter and book, as returned by searches
/// and bookmark listings.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct VerseInContext {
    #[serde(flatten)]
    pub verse: Verse,
    pub chapter: ChapterWithBook,
}

impl From<(Verse, (Chapter, Book))> for VerseInContext {
    fn from((verse, (chapter, book)): (Verse, (Chapter, Book))) -> Self {
        VerseInContext {
            verse,
            chapter: ChapterWithBook { chapter, book },
        }
    }
}

mod reference;
mod study;

pub use self::reference::Reference;
pub use self::study::*;
