//! Defines the endpoint for deleting a purchase.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{UserID, get_user_by_id},
    database_id::PurchaseId,
    endpoints,
    purchase::core::delete_purchase,
};

/// The state needed to delete a purchase.
#[derive(Debug, Clone)]
pub struct DeletePurchaseState {
    /// The database connection for managing purchases.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeletePurchaseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a purchase, redirects to the dashboard on
/// success.
///
/// The delete is scoped to the authenticated account's email, so a request
/// for another account's purchase reports not-found.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_purchase_endpoint(
    State(state): State<DeletePurchaseState>,
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
            return error.into_alert_response();
        }
    };

    match delete_purchase(purchase_id, user.email.as_str(), &connection) {
        Ok(()) => (
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::DeleteMissingPurchase) => Error::DeleteMissingPurchase.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not delete purchase {purchase_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_htmx::HX_REDIRECT;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        auth::{PasswordHash, UserID, create_user},
        db::initialize,
        endpoints,
        purchase::{Purchase, count_purchases, create_purchase},
    };

    use super::{DeletePurchaseState, delete_purchase_endpoint};

    const OWNER: &str = "foo@bar.baz";

    fn get_test_state() -> (DeletePurchaseState, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user_id = create_user(
            OWNER.parse().unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap()
        .id;

        let state = DeletePurchaseState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        (state, user_id)
    }

    #[tokio::test]
    async fn deletes_owned_purchase_and_redirects_to_dashboard() {
        let (state, user_id) = get_test_state();
        let purchase = {
            let connection = state.db_connection.lock().unwrap();
            create_purchase(
                Purchase::build(date!(2025 - 10 - 05), "Joe's Hardware", 12.3, OWNER),
                &connection,
            )
            .unwrap()
        };

        let response =
            delete_purchase_endpoint(State(state.clone()), Extension(user_id), Path(purchase.id))
                .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(HX_REDIRECT).unwrap(),
            endpoints::DASHBOARD_VIEW
        );

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_purchases(&connection), Ok(0));
    }

    #[tokio::test]
    async fn deleting_foreign_purchase_returns_not_found_and_keeps_row() {
        let (state, user_id) = get_test_state();
        let foreign_purchase = {
            let connection = state.db_connection.lock().unwrap();
            create_purchase(
                Purchase::build(date!(2025 - 10 - 05), "Other Vendor", 12.3, "other@example.com"),
                &connection,
            )
            .unwrap()
        };

        let response = delete_purchase_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(foreign_purchase.id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_purchases(&connection), Ok(1));
    }

    #[tokio::test]
    async fn deleting_missing_purchase_returns_not_found() {
        let (state, user_id) = get_test_state();

        let response =
            delete_purchase_endpoint(State(state), Extension(user_id), Path(1337)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
