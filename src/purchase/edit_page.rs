//! The page for editing an existing purchase.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::{UserID, get_user_by_id},
    database_id::PurchaseId,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, LINK_STYLE, base, dollar_input_styles,
        loading_spinner,
    },
    navigation::NavBar,
    purchase::{
        Purchase, detail_page::purchase_not_found_view,
        form::{PurchaseFormDefaults, purchase_form_fields},
        get_purchase,
    },
    timezone::get_local_offset,
};

/// The state needed for the edit purchase page.
#[derive(Debug, Clone)]
pub struct EditPurchasePageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for accessing purchases.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditPurchasePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for editing a purchase, scoped to the owner's email.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_edit_purchase_page(
    State(state): State<EditPurchasePageState>,
    Extension(user_id): Extension<UserID>,
    Path(purchase_id): Path<PurchaseId>,
) -> Response {
    let connection = state
        .db_connection
        .lock()
        .expect("Could not acquire database lock");

    let user = match get_user_by_id(user_id, &connection) {
        Ok(user) => user,
        Err(error) => {
            tracing::error!("Failed to retrieve user {user_id}: {error}");
            return error.into_response();
        }
    };

    let purchase = match get_purchase(purchase_id, user.email.as_str(), &connection) {
        Ok(purchase) => purchase,
        Err(Error::NotFound) => {
            return purchase_not_found_view();
        }
        Err(error) => {
            tracing::error!("Failed to retrieve purchase {purchase_id}: {error}");
            return error.into_response();
        }
    };

    let local_offset = match get_local_offset(&state.local_timezone) {
        Some(offset) => offset,
        None => return Error::InvalidTimezoneError(state.local_timezone).into_response(),
    };
    let max_date = OffsetDateTime::now_utc().to_offset(local_offset).date();

    edit_purchase_view(&purchase, max_date).into_response()
}

fn edit_purchase_view(purchase: &Purchase, max_date: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::EDIT_PURCHASE_VIEW).into_html();
    let update_url = endpoints::format_endpoint(endpoints::PURCHASE_API, purchase.id);
    let detail_url = endpoints::format_endpoint(endpoints::PURCHASE_VIEW, purchase.id);

    let defaults = PurchaseFormDefaults {
        trans_date: purchase.trans_date,
        vendor: Some(&purchase.vendor),
        tot_amount: Some(purchase.tot_amount),
        tax: purchase.tax,
        description: if purchase.description.is_empty() {
            None
        } else {
            Some(&purchase.description)
        },
        max_date,
    };

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold my-4" { "Edit Purchase" }

            form
                hx-put=(update_url)
                hx-indicator="#indicator"
                hx-target-4xx="#alert-container"
                hx-target-5xx="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                (purchase_form_fields(&defaults))

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span class="inline htmx-indicator" id="indicator"
                    {
                        (loading_spinner())
                    }
                    "Save Changes"
                }

                p class="text-center"
                {
                    a href=(detail_url) class=(LINK_STYLE) { "Cancel" }
                }
            }
        }
    };

    base("Edit Purchase", &[dollar_input_styles()], &content)
}
