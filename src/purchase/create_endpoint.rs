//! Defines the endpoint for logging a new purchase.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::{UserID, get_user_by_id},
    endpoints,
    purchase::{Purchase, core::create_purchase, form::PurchaseFormData},
    timezone::get_local_offset,
};

/// The state needed to create a purchase.
#[derive(Debug, Clone)]
pub struct CreatePurchaseState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for managing purchases.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreatePurchaseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Check the form fields that the client-side `required`/`min`/`max`
/// attributes are supposed to enforce, in case the request skipped the form.
pub(super) fn validate_purchase_form(form: &PurchaseFormData, today: Date) -> Result<(), Error> {
    if form.vendor.trim().is_empty() {
        return Err(Error::EmptyVendor);
    }

    if form.tot_amount < 0.0 {
        return Err(Error::NegativeAmount(form.tot_amount));
    }

    if form.trans_date > today {
        return Err(Error::FutureDate(form.trans_date));
    }

    Ok(())
}

/// A route handler for logging a new purchase, redirects to the dashboard on
/// success.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_purchase_endpoint(
    State(state): State<CreatePurchaseState>,
    Extension(user_id): Extension<UserID>,
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

    let connection = state
        .db_connection
        .lock()
        .expect("Could not acquire database lock");

    let user = match get_user_by_id(user_id, &connection) {
        Ok(user) => user,
        Err(error) => {
            tracing::error!("Failed to retrieve user {user_id}: {error}");
            return error.into_alert_response();
        }
    };

    let builder = Purchase::build(
        form.trans_date,
        form.vendor.trim(),
        form.tot_amount,
        user.email.as_str(),
    )
    .tax(form.tax_paid())
    .description(form.description.as_deref().unwrap_or(""));

    if let Err(error) = create_purchase(builder, &connection) {
        tracing::error!("Failed to log purchase: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
