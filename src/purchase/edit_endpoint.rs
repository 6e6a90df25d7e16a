//! Defines the endpoint for saving changes to a purchase.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::{UserID, get_user_by_id},
    database_id::PurchaseId,
    endpoints,
    purchase::{
        PurchaseUpdate, core::update_purchase, create_endpoint::validate_purchase_form,
        form::PurchaseFormData,
    },
    timezone::get_local_offset,
};

/// The state needed to update a purchase.
#[derive(Debug, Clone)]
pub struct EditPurchaseState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for managing purchases.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditPurchaseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for saving changes to a purchase, redirects to the detail
/// view on success.
///
/// The update is scoped to the authenticated account's email, so a request
/// for another account's purchase reports not-found.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn edit_purchase_endpoint(
    State(state): State<EditPurchaseState>,
    Extension(user_id): Extension<UserID>,
    Path(purchase_id): Path<PurchaseId>,
    Form(form): Form<PurchaseFormData>,
) -> Response {
    let local_offset = match get_local_offset(&state.local_timezone) {
        Some(offset) => offset,
        None => {
            return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
        }
    };
    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();

    if let Err(error) = validate_purchase_form(&form, today) {
        return error.into_alert_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let user = match get_user_by_id(user_id, &connection) {
        Ok(user) => user,
        Err(error) => {
            tracing::error!("Failed to retrieve user {user_id}: {error}");
            return error.into_alert_response();
        }
    };

    let update = PurchaseUpdate {
        trans_date: form.trans_date,
        vendor: form.vendor.trim().to_owned(),
        tot_amount: form.tot_amount,
        tax: form.tax_paid(),
        description: form.description.unwrap_or_default(),
    };

    match update_purchase(purchase_id, user.email.as_str(), &update, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::format_endpoint(
                endpoints::PURCHASE_VIEW,
                purchase_id,
            )),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingPurchase) => Error::UpdateMissingPurchase.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not update purchase {purchase_id}: {error}");
            error.into_alert_response()
        }
    }
}
