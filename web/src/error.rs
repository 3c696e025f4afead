use std::convert::From;

use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use actix_web::ResponseError;
use handlebars::Handlebars;
use lazy_static::lazy_static;
use log::error;
use thiserror::Error;

use db::DbError;

use crate::responder::{ErrorData, Meta, TemplateData};

/// Error type for the Lamp web application.
#[derive(Error, Debug)]
pub enum Error {
    #[error("There was an error with the blocking thread pool. Cause: {}", cause)]
    Blocking { cause: String },

    #[error("{}", _0)]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{}", _0)]
    NotFound(String),

    #[error("There was a database error.")]
    Db,

    #[error("AI provider request failed: {}", cause)]
    Ai { cause: String },

    #[error("{}", _0)]
    NotConfigured(String),

    #[error("Could not download {}: {}", url, cause)]
    Download { url: String, cause: String },

    #[error("There was an error rendering the HTML page.")]
    Template,
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Blocking { .. }
            | Error::Db
            | Error::Ai { .. }
            | Error::NotConfigured(_)
            | Error::Download { .. }
            | Error::Template => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DbError> for Error {
    fn from(e: DbError) -> Self {
        match e {
            DbError::ChapterNotFound { .. }
            | DbError::VerseNotFound { .. }
            | DbError::NotFound { .. } => Error::NotFound(e.to_string()),
            DbError::InvalidReference { .. } => Error::BadRequest(e.to_string()),
            _ => {
                error!("{}", e);
                Error::Db
            }
        }
    }
}

impl From<BlockingError> for Error {
    fn from(e: BlockingError) -> Self {
        Error::Blocking {
            cause: e.to_string(),
        }
    }
}

/// Error to display as JSON (`{"error": "..."}`).
#[derive(Error, Debug)]
#[error("{}", _0)]
pub struct JsonError(pub Error);

impl From<Error> for JsonError {
    fn from(e: Error) -> Self {
        JsonError(e)
    }
}

impl From<DbError> for JsonError {
    fn from(e: DbError) -> Self {
        JsonError(Error::from(e))
    }
}

impl From<BlockingError> for JsonError {
    fn from(e: BlockingError) -> Self {
        JsonError(Error::from(e))
    }
}

impl ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        self.0.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Unhandled: {}", &self.0);
        }
        HttpResponse::build(status).json(ErrorData::from_error(&self.0))
    }
}

lazy_static! {
    static ref ERR_TPL: Handlebars<'static> = {
        let mut tpl = Handlebars::new();
        for (name, source) in [
            ("base", include_str!("../templates/base.hbs")),
            ("error", include_str!("../templates/error.hbs")),
        ] {
            if let Err(e) = tpl.register_template_string(name, source) {
                error!("Could not register the {} template: {}", name, e);
            }
        }
        tpl
    };
}

/// Error to display as HTML.
#[derive(Error, Debug)]
#[error("HTML Error: {}", _0)]
pub struct HtmlError(pub Error);

impl From<Error> for HtmlError {
    fn from(e: Error) -> Self {
        HtmlError(e)
    }
}

impl From<DbError> for HtmlError {
    fn from(e: DbError) -> Self {
        HtmlError(Error::from(e))
    }
}

impl From<BlockingError> for HtmlError {
    fn from(e: BlockingError) -> Self {
        HtmlError(Error::from(e))
    }
}

impl ResponseError for HtmlError {
    fn status_code(&self) -> StatusCode {
        self.0.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Unhandled: {}", &self.0);
        }
        let body = TemplateData::new(ErrorData::from_error(&self.0), Meta::for_error())
            .to_html("error", &ERR_TPL)
            .unwrap_or_else(|_| self.0.to_string());

        HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(body)
    }
}
