use chrono::Utc;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use serde_json::Value;

use crate::models::Outline;
use crate::schema::outlines;
use crate::{DbConnection, DbError};

/// Lists a user's outlines, newest first.
pub fn list(user_id: &str, conn: &mut DbConnection) -> Result<Vec<Outline>, DbError> {
    outlines::table
        .filter(outlines::user_id.eq(user_id))
        .order_by((
            outlines::created_at.desc(),
            sql::<BigInt>("outlines.rowid").desc(),
        ))
        .load(conn)
        .map_err(DbError::from)
}

/// Creates an outline. The verse selection is kept as the JSON text the
/// client sent.
pub fn create(
    user_id: &str,
    title: &str,
    content: &str,
    verses: Option<&Value>,
    conn: &mut DbConnection,
) -> Result<Outline, DbError> {
    let verses = verses
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| DbError::Other {
            cause: e.to_string(),
        })?;

    let outline = Outline {
        id: super::new_id(),
        user_id: user_id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        verses,
        created_at: Utc::now().naive_utc(),
    };
    diesel::insert_into(outlines::table)
        .values(&outline)
        .execute(conn)?;

    Ok(outline)
}

/// Deletes an outline if it belongs to the user.
pub fn delete(user_id: &str, id: &str, conn: &mut DbConnection) -> Result<(), DbError> {
    let deleted = diesel::delete(
        outlines::table
            .filter(outlines::id.eq(id))
            .filter(outlines::user_id.eq(user_id)),
    )
    .execute(conn)?;

    match deleted {
        0 => Err(DbError::NotFound {
            kind: "outline",
            id: id.to_string(),
        }),
        _ => Ok(()),
    }
}
