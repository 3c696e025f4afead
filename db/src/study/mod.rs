//! Per-user study data: accounts, bookmarks, outlines and reader settings.
//!
//! Every mutation takes the acting user's id; rows owned by someone else
//! are reported as not found rather than forbidden, so ids of other users'
//! data are never confirmed.
use uuid::Uuid;

pub mod bookmarks;
pub mod outlines;
pub mod settings;
pub mod users;

/// New random identifier for user-owned rows.
fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::User;
    use crate::DbConnection;

    pub fn user(email: &str, conn: &mut DbConnection) -> User {
        super::users::find_or_create_by_email(email, None, conn).unwrap()
    }
}
