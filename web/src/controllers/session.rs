//! Sign-in and session lookup.
use std::time::SystemTime;

use actix_web::web;
use log::info;
use serde::{Deserialize, Serialize};

use db::models::User;
use db::study::users;
use db::DbError;

use crate::auth::{mint_token, CurrentUser};
use crate::controllers::{present, JsonResult};
use crate::error::Error;
use crate::ServerData;

#[derive(Deserialize, Debug)]
pub struct LoginForm {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    pub user: User,
}

/// Signs a user in by email, creating the account on first use, and
/// returns a bearer token for the other endpoints.
pub async fn login(
    data: web::Data<ServerData>,
    form: web::Json<LoginForm>,
) -> JsonResult<LoginResponse> {
    let form = form.into_inner();
    let email = present(&form.email)
        .filter(|e| e.contains('@'))
        .ok_or_else(|| Error::BadRequest("A valid email is required".to_string()))?
        .to_string();

    let db = data.db.to_owned();
    let user = web::block(move || -> Result<_, DbError> {
        users::find_or_create_by_email(&email, form.name.as_deref(), &mut *db.get()?)
    })
    .await??;

    let token = mint_token(&user.id, &user.email, SystemTime::now(), &data.config.auth_secret)?;
    info!("User {} signed in", user.id);

    Ok(web::Json(LoginResponse { token, user }))
}

/// Returns the account behind the request's token.
pub async fn session(data: web::Data<ServerData>, user: CurrentUser) -> JsonResult<SessionResponse> {
    let db = data.db.to_owned();
    let user = web::block(move || -> Result<_, DbError> { users::find(&user.id, &mut *db.get()?) })
        .await?
        .map_err(|e| match e {
            // The account behind a still valid token is gone.
            DbError::NotFound { .. } => Error::Unauthorized,
            e => Error::from(e),
        })?;

    Ok(web::Json(SessionResponse { user }))
}
