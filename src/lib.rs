//! EasyCeipt is a web app for tracking purchases and the sales tax paid on
//! them.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use time::Date;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod database_id;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod landing;
mod logging;
mod navigation;
mod not_found;
mod purchase;
mod routing;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{PasswordHash, User, UserID, ValidatedPassword};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;

use crate::{
    alert::{Alert, render_alert},
    internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an email and password combination that does not
    /// match a registered account.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing or formatting a date in the auth token.
    ///
    /// Callers should pass in the original error as a string.
    #[error("could not handle auth token date-time: {0}")]
    DateError(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The email used to register an account already belongs to an account.
    #[error("an account with this email already exists")]
    DuplicateEmail,

    /// An empty string was used for a purchase's vendor.
    #[error("Vendor cannot be empty")]
    EmptyVendor,

    /// A negative amount was used for a purchase.
    ///
    /// Purchases record money spent, so the total amount must be zero or
    /// greater.
    #[error("{0} is a negative amount, which is not allowed")]
    NegativeAmount(f64),

    /// A date in the future was used for a purchase.
    ///
    /// Purchases record events that have already happened, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to update a purchase that does not exist or belongs to another
    /// account.
    #[error("tried to update a purchase that is not in the database")]
    UpdateMissingPurchase,

    /// Tried to delete a purchase that does not exist or belongs to another
    /// account.
    #[error("tried to delete a purchase that is not in the database")]
    DeleteMissingPurchase,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::InvalidTimezoneError(timezone) => render_alert(
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::error(
                    "Invalid Timezone Settings",
                    &format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                ),
            ),
            Error::FutureDate(date) => render_alert(
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid purchase date",
                    &format!(
                        "{date} is a date in the future, which is not allowed. Change the date to today or earlier."
                    ),
                ),
            ),
            Error::NegativeAmount(amount) => render_alert(
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid amount",
                    &format!("{amount} is negative. The amount must be zero or greater."),
                ),
            ),
            Error::EmptyVendor => render_alert(
                StatusCode::BAD_REQUEST,
                Alert::error("Invalid vendor", "The vendor name cannot be empty."),
            ),
            Error::UpdateMissingPurchase => render_alert(
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not update purchase",
                    "Purchase not found or access denied.",
                ),
            ),
            Error::DeleteMissingPurchase => render_alert(
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not delete purchase",
                    "Purchase not found or access denied. \
                    Try refreshing the page to see if the purchase has already been deleted.",
                ),
            ),
            _ => render_alert(
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                ),
            ),
        }
    }
}
