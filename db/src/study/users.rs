use diesel::prelude::*;

use crate::models::User;
use crate::schema::users;
use crate::{DbConnection, DbError};

/// Finds the user with the given email, creating the account on first
/// sign-in. A new account's name defaults to the local part of the email.
pub fn find_or_create_by_email(
    email: &str,
    name: Option<&str>,
    conn: &mut DbConnection,
) -> Result<User, DbError> {
    let email = email.trim();

    conn.transaction::<_, DbError, _>(|conn| {
        if let Some(user) = users::table
            .filter(users::email.eq(email))
            .first::<User>(conn)
            .optional()?
        {
            return Ok(user);
        }

        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or(email));
        let user = User {
            id: super::new_id(),
            email: email.to_string(),
            name: Some(name.to_string()),
        };
        diesel::insert_into(users::table)
            .values(&user)
            .execute(conn)?;

        Ok(user)
    })
}

pub fn find(id: &str, conn: &mut DbConnection) -> Result<User, DbError> {
    users::table
        .find(id)
        .first::<User>(conn)
        .optional()?
        .ok_or_else(|| DbError::NotFound {
            kind: "user",
            id: id.to_string(),
        })
}
