use diesel::prelude::*;
use serde::Deserialize;

use crate::models::UserSettings;
use crate::schema::user_settings;
use crate::{DbConnection, DbError};

pub const DEFAULT_VERSION: &str = "nvi";
pub const DEFAULT_FONT_SIZE: i32 = 16;

/// A partial settings update; absent fields are left as they are.
#[derive(AsChangeset, Clone, Debug, Default, Deserialize, PartialEq)]
#[diesel(table_name = user_settings)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub bible_version_id: Option<String>,
    pub font_size: Option<i32>,
    pub dark_mode: Option<bool>,
}

impl SettingsPatch {
    fn is_empty(&self) -> bool {
        self.bible_version_id.is_none() && self.font_size.is_none() && self.dark_mode.is_none()
    }
}

fn defaults(user_id: &str) -> UserSettings {
    UserSettings {
        user_id: user_id.to_string(),
        bible_version_id: DEFAULT_VERSION.to_string(),
        font_size: DEFAULT_FONT_SIZE,
        dark_mode: false,
    }
}

fn find(user_id: &str, conn: &mut DbConnection) -> Result<Option<UserSettings>, DbError> {
    user_settings::table
        .find(user_id)
        .first(conn)
        .optional()
        .map_err(DbError::from)
}

/// Gets a user's settings, storing the defaults on first access.
pub fn get_or_create(user_id: &str, conn: &mut DbConnection) -> Result<UserSettings, DbError> {
    conn.transaction::<_, DbError, _>(|conn| {
        if let Some(settings) = find(user_id, conn)? {
            return Ok(settings);
        }

        let settings = defaults(user_id);
        diesel::insert_into(user_settings::table)
            .values(&settings)
            .execute(conn)?;
        Ok(settings)
    })
}

/// Applies a partial update, creating the settings row (defaults for the
/// fields not supplied) if the user has none yet.
pub fn update(
    user_id: &str,
    patch: &SettingsPatch,
    conn: &mut DbConnection,
) -> Result<UserSettings, DbError> {
    conn.transaction::<_, DbError, _>(|conn| {
        if find(user_id, conn)?.is_some() {
            // An empty changeset is an error in diesel
            if !patch.is_empty() {
                diesel::update(user_settings::table.find(user_id))
                    .set(patch)
                    .execute(conn)?;
            }
        } else {
            let mut settings = defaults(user_id);
            if let Some(version) = &patch.bible_version_id {
                settings.bible_version_id = version.to_owned();
            }
            settings.font_size = patch.font_size.unwrap_or(settings.font_size);
            settings.dark_mode = patch.dark_mode.unwrap_or(settings.dark_mode);
            diesel::insert_into(user_settings::table)
                .values(&settings)
                .execute(conn)?;
        }

        find(user_id, conn)?.ok_or_else(|| DbError::NotFound {
            kind: "settings",
            id: user_id.to_string(),
        })
    })
}
