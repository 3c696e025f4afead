use chrono::NaiveDateTime;
use diesel::{Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use super::VerseInContext;
use crate::schema::{bookmarks, outlines, user_settings, users};

#[derive(Clone, Debug, Deserialize, Insertable, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = users)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

/// A highlighted verse with an optional note.
#[derive(Clone, Debug, Deserialize, Insertable, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = bookmarks)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub user_id: String,
    pub verse_id: i32,
    pub color: String,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

/// A bookmark with the verse it points at.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct BookmarkDetail {
    #[serde(flatten)]
    pub bookmark: Bookmark,
    pub verse: VerseInContext,
}

/// User-authored study notes. `verses` holds the JSON the client sent,
/// stored as text.
#[derive(Clone, Debug, Deserialize, Insertable, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = outlines)]
#[serde(rename_all = "camelCase")]
pub struct Outline {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub verses: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize, Insertable, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = user_settings)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub user_id: String,
    pub bible_version_id: String,
    pub font_size: i32,
    pub dark_mode: bool,
}
