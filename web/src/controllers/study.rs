//! Bookmarks, outlines and reader settings of the signed-in user.
use actix_web::web;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use db::models::{BookmarkDetail, Outline, UserSettings};
use db::study::bookmarks::{self, NewBookmark};
use db::study::settings::{self, SettingsPatch};
use db::study::outlines;
use db::DbError;

use crate::auth::CurrentUser;
use crate::controllers::{present, JsonResult};
use crate::error::Error;
use crate::ServerData;

#[derive(Serialize, Deserialize, Debug)]
pub struct BookmarksResponse {
    pub bookmarks: Vec<BookmarkDetail>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BookmarkResponse {
    pub bookmark: BookmarkDetail,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkForm {
    pub verse_id: Option<i32>,
    pub color: Option<String>,
    pub note: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct OutlinesResponse {
    pub outlines: Vec<Outline>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct OutlineResponse {
    pub outline: Outline,
}

#[derive(Deserialize, Debug)]
pub struct OutlineForm {
    pub title: Option<String>,
    pub content: Option<String>,
    pub verses: Option<Value>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SettingsResponse {
    pub settings: UserSettings,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct DeletedResponse {
    pub success: bool,
}

pub async fn list_bookmarks(
    data: web::Data<ServerData>,
    user: CurrentUser,
) -> JsonResult<BookmarksResponse> {
    let db = data.db.to_owned();
    let bookmarks = web::block(move || -> Result<_, DbError> {
        bookmarks::list(&user.id, &mut *db.get()?)
    })
    .await??;

    Ok(web::Json(BookmarksResponse { bookmarks }))
}

pub async fn create_bookmark(
    data: web::Data<ServerData>,
    user: CurrentUser,
    form: web::Json<BookmarkForm>,
) -> JsonResult<BookmarkResponse> {
    let form = form.into_inner();
    let verse_id = form
        .verse_id
        .ok_or_else(|| Error::BadRequest("verseId is required".to_string()))?;

    let db = data.db.to_owned();
    let bookmark = web::block(move || -> Result<_, DbError> {
        let new = NewBookmark {
            verse_id,
            color: form.color.as_deref(),
            note: form.note.as_deref(),
        };
        bookmarks::create(&user.id, new, &mut *db.get()?)
    })
    .await??;

    Ok(web::Json(BookmarkResponse { bookmark }))
}

pub async fn delete_bookmark(
    data: web::Data<ServerData>,
    user: CurrentUser,
    path: web::Path<(String,)>,
) -> JsonResult<DeletedResponse> {
    let (id,) = path.into_inner();
    let db = data.db.to_owned();
    web::block(move || -> Result<_, DbError> { bookmarks::delete(&user.id, &id, &mut *db.get()?) })
        .await??;

    Ok(web::Json(DeletedResponse { success: true }))
}

pub async fn list_outlines(
    data: web::Data<ServerData>,
    user: CurrentUser,
) -> JsonResult<OutlinesResponse> {
    let db = data.db.to_owned();
    let outlines =
        web::block(move || -> Result<_, DbError> { outlines::list(&user.id, &mut *db.get()?) })
            .await??;

    Ok(web::Json(OutlinesResponse { outlines }))
}

pub async fn create_outline(
    data: web::Data<ServerData>,
    user: CurrentUser,
    form: web::Json<OutlineForm>,
) -> JsonResult<OutlineResponse> {
    let form = form.into_inner();
    let (title, content) = match (present(&form.title), present(&form.content)) {
        (Some(title), Some(content)) => (title.to_string(), content.to_string()),
        _ => return Err(Error::BadRequest("title and content are required".to_string()).into()),
    };

    let db = data.db.to_owned();
    let outline = web::block(move || -> Result<_, DbError> {
        let verses = form.verses.filter(|v| !v.is_null());
        outlines::create(&user.id, &title, &content, verses.as_ref(), &mut *db.get()?)
    })
    .await??;

    Ok(web::Json(OutlineResponse { outline }))
}

pub async fn delete_outline(
    data: web::Data<ServerData>,
    user: CurrentUser,
    path: web::Path<(String,)>,
) -> JsonResult<DeletedResponse> {
    let (id,) = path.into_inner();
    let db = data.db.to_owned();
    web::block(move || -> Result<_, DbError> { outlines::delete(&user.id, &id, &mut *db.get()?) })
        .await??;

    Ok(web::Json(DeletedResponse { success: true }))
}

pub async fn get_settings(
    data: web::Data<ServerData>,
    user: CurrentUser,
) -> JsonResult<SettingsResponse> {
    let db = data.db.to_owned();
    let settings = web::block(move || -> Result<_, DbError> {
        settings::get_or_create(&user.id, &mut *db.get()?)
    })
    .await??;

    Ok(web::Json(SettingsResponse { settings }))
}

pub async fn update_settings(
    data: web::Data<ServerData>,
    user: CurrentUser,
    patch: web::Json<SettingsPatch>,
) -> JsonResult<SettingsResponse> {
    let patch = patch.into_inner();
    let db = data.db.to_owned();
    let settings = web::block(move || -> Result<_, DbError> {
        settings::update(&user.id, &patch, &mut *db.get()?)
    })
    .await??;

    Ok(web::Json(SettingsResponse { settings }))
}
