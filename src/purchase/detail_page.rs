//! The purchase detail page.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::{format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    AppState, Error,
    auth::{UserID, get_user_by_id},
    database_id::PurchaseId,
    endpoints,
    html::{
        BADGE_MUTED_STYLE, BADGE_STYLE, BUTTON_DELETE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        base, format_currency,
    },
    navigation::NavBar,
    purchase::{Purchase, get_purchase},
};

/// The user-facing message shown when a purchase does not exist or belongs to
/// another account. The two cases are deliberately indistinguishable.
pub const PURCHASE_NOT_FOUND_MSG: &str = "Purchase not found or access denied";

/// Date format for the detail view, e.g. "Monday, January 5, 2025".
const LONG_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[weekday repr:long], [month repr:long] [day padding:none], [year]");

/// The state needed for the purchase detail page.
#[derive(Debug, Clone)]
pub struct PurchaseDetailPageState {
    /// The database connection for accessing purchases.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for PurchaseDetailPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the detail page for a single purchase, scoped to the owner's email.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_purchase_detail_page(
    State(state): State<PurchaseDetailPageState>,
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

    match get_purchase(purchase_id, user.email.as_str(), &connection) {
        Ok(purchase) => purchase_detail_view(&purchase).into_response(),
        Err(Error::NotFound) => purchase_not_found_view(),
        Err(error) => {
            tracing::error!("Failed to retrieve purchase {purchase_id}: {error}");
            error.into_response()
        }
    }
}

/// Render the "not found or access denied" page.
///
/// Shared with the edit page, which has the same ownership scoping.
pub(super) fn purchase_not_found_view() -> Response {
    let nav_bar = NavBar::new(endpoints::PURCHASE_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="rounded bg-white dark:bg-gray-800 shadow-sm border dark:border-gray-700 p-6 text-center"
            {
                p class="text-red-600 dark:text-red-400 text-lg mb-4" { (PURCHASE_NOT_FOUND_MSG) }

                a href=(endpoints::DASHBOARD_VIEW) class=(LINK_STYLE) { "Back to Dashboard" }
            }
        }
    };

    (StatusCode::NOT_FOUND, base("Purchase Details", &[], &content)).into_response()
}

fn labelled_field(label: &str, value: Markup) -> Markup {
    html! {
        div
        {
            p class="text-sm font-medium text-gray-500 dark:text-gray-400 mb-1" { (label) }
            div class="text-lg" { (value) }
        }
    }
}

fn purchase_detail_view(purchase: &Purchase) -> Markup {
    let nav_bar = NavBar::new(endpoints::PURCHASE_VIEW).into_html();
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_PURCHASE_VIEW, purchase.id);
    let delete_url = endpoints::format_endpoint(endpoints::PURCHASE_API, purchase.id);
    let long_date = purchase
        .trans_date
        .format(LONG_DATE_FORMAT)
        .unwrap_or_else(|_| purchase.trans_date.to_string());
    let confirm_message = format!(
        "Are you sure you want to delete the purchase at '{}'? This cannot be undone.",
        purchase.vendor
    );

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full lg:max-w-3xl rounded bg-white dark:bg-gray-800 shadow-sm border dark:border-gray-700 overflow-hidden"
            {
                header class="bg-gray-50 dark:bg-gray-700 px-6 py-4 border-b dark:border-gray-600 flex justify-between items-start"
                {
                    div
                    {
                        h1 class="text-xl font-semibold" { (purchase.vendor) }
                        p class="text-sm text-gray-500 dark:text-gray-400 mt-1"
                        {
                            "Purchase ID: " (purchase.id)
                        }
                    }

                    div class="text-right"
                    {
                        p class="text-2xl font-bold" { (format_currency(purchase.tot_amount)) }

                        @if purchase.tax {
                            p class="text-sm text-green-600 dark:text-green-400 font-medium mt-1"
                            {
                                "Tax Paid ✓"
                            }
                        }
                    }
                }

                div class="px-6 py-6 grid grid-cols-1 md:grid-cols-2 gap-6"
                {
                    div class="space-y-4"
                    {
                        (labelled_field("Transaction Date", html! {
                            time datetime=(purchase.trans_date) { (long_date) }
                        }))
                        (labelled_field("Vendor", html! { (purchase.vendor) }))
                        (labelled_field("Amount", html! {
                            span class="font-semibold" { (format_currency(purchase.tot_amount)) }
                        }))
                    }

                    div class="space-y-4"
                    {
                        (labelled_field("Tax Status", html! {
                            @if purchase.tax {
                                span class=(BADGE_STYLE) { "Tax Paid" }
                            } @else {
                                span class=(BADGE_MUTED_STYLE) { "No Tax" }
                            }
                        }))

                        @if purchase.tax {
                            (labelled_field("Tax Amount", html! {
                                (format_currency(purchase.tax_amount()))
                            }))
                            (labelled_field("Total Including Tax", html! {
                                (format_currency(purchase.real_amount()))
                            }))
                        }

                        (labelled_field("Account Email", html! { (purchase.email) }))
                    }
                }

                @if !purchase.description.is_empty() {
                    div class="px-6 pb-6"
                    {
                        p class="text-sm font-medium text-gray-500 dark:text-gray-400 mb-2" { "Description" }

                        div class="bg-gray-50 dark:bg-gray-700 rounded-lg p-4"
                        {
                            p class="whitespace-pre-wrap" { (purchase.description) }
                        }
                    }
                }

                footer class="bg-gray-50 dark:bg-gray-700 px-6 py-4 border-t dark:border-gray-600 flex justify-between items-center"
                {
                    a href=(endpoints::DASHBOARD_VIEW) class=(LINK_STYLE) { "← Back to Dashboard" }

                    div class="flex gap-3"
                    {
                        a
                            href=(edit_url)
                            class="px-4 py-2 bg-blue-600 hover:bg-blue-700 text-white rounded"
                        {
                            "Edit Purchase"
                        }

                        button
                            hx-delete=(delete_url)
                            hx-confirm=(confirm_message)
                            hx-target-4xx="#alert-container"
                            hx-target-5xx="#alert-container"
                            class=(BUTTON_DELETE_STYLE)
                        {
                            "Delete Purchase"
                        }
                    }
                }
            }
        }
    };

    base("Purchase Details", &[], &content)
}

#[cfg(test)]
mod purchase_detail_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        auth::{PasswordHash, UserID, create_user},
        db::initialize,
        endpoints,
        purchase::{Purchase, create_purchase},
        test_utils::{assert_valid_html, parse_html_document},
    };

    use super::{PURCHASE_NOT_FOUND_MSG, PurchaseDetailPageState, get_purchase_detail_page};

    const OWNER: &str = "foo@bar.baz";

    fn get_test_state() -> (PurchaseDetailPageState, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user_id = create_user(
            OWNER.parse().unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap()
        .id;

        let state = PurchaseDetailPageState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        (state, user_id)
    }

    #[tokio::test]
    async fn shows_purchase_fields_and_derived_amounts() {
        let (state, user_id) = get_test_state();
        let purchase = {
            let connection = state.db_connection.lock().unwrap();
            create_purchase(
                Purchase::build(date!(2025 - 10 - 05), "Joe's Hardware", 100.0, OWNER)
                    .tax(true)
                    .description("nails and timber"),
                &connection,
            )
            .unwrap()
        };

        let response =
            get_purchase_detail_page(State(state), Extension(user_id), Path(purchase.id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let text = document.html();
        assert!(text.contains("Joe's Hardware"));
        assert!(text.contains("$100.00"), "want the total amount");
        assert!(text.contains("$6.00"), "want the 6% tax amount");
        assert!(text.contains("$106.00"), "want the total including tax");
        assert!(text.contains("nails and timber"));
        assert!(text.contains(OWNER), "want the owning account email");
        assert!(text.contains("Sunday, October 5, 2025"));
    }

    #[tokio::test]
    async fn untaxed_purchase_hides_derived_amounts() {
        let (state, user_id) = get_test_state();
        let purchase = {
            let connection = state.db_connection.lock().unwrap();
            create_purchase(
                Purchase::build(date!(2025 - 10 - 05), "Joe's Hardware", 100.0, OWNER),
                &connection,
            )
            .unwrap()
        };

        let response =
            get_purchase_detail_page(State(state), Extension(user_id), Path(purchase.id)).await;

        let document = parse_html_document(response).await;
        let text = document.html();

        assert!(text.contains("No Tax"));
        assert!(
            !text.contains("Tax Amount"),
            "untaxed purchases should not show a tax amount"
        );
    }

    #[tokio::test]
    async fn has_edit_link_and_delete_button() {
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
            get_purchase_detail_page(State(state), Extension(user_id), Path(purchase.id)).await;

        let document = parse_html_document(response).await;

        let edit_url = endpoints::format_endpoint(endpoints::EDIT_PURCHASE_VIEW, purchase.id);
        let edit_selector = Selector::parse(&format!("a[href='{edit_url}']")).unwrap();
        assert!(
            document.select(&edit_selector).next().is_some(),
            "want a link to the edit page"
        );

        let delete_url = endpoints::format_endpoint(endpoints::PURCHASE_API, purchase.id);
        let delete_selector = Selector::parse(&format!("button[hx-delete='{delete_url}']")).unwrap();
        let delete_button = document
            .select(&delete_selector)
            .next()
            .expect("want a delete button targeting the purchase API");
        assert!(
            delete_button.value().attr("hx-confirm").is_some(),
            "want the delete button to ask for confirmation"
        );
    }

    #[tokio::test]
    async fn foreign_purchase_renders_not_found_page() {
        let (state, user_id) = get_test_state();
        let foreign_purchase = {
            let connection = state.db_connection.lock().unwrap();
            create_purchase(
                Purchase::build(
                    date!(2025 - 10 - 05),
                    "Someone Else's Vendor",
                    12.3,
                    "other@example.com",
                ),
                &connection,
            )
            .unwrap()
        };

        let response =
            get_purchase_detail_page(State(state), Extension(user_id), Path(foreign_purchase.id))
                .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let document = parse_html_document(response).await;
        let text = document.html();

        assert!(text.contains(PURCHASE_NOT_FOUND_MSG));
        assert!(
            !text.contains("Someone Else's Vendor"),
            "the page must not leak another account's purchase"
        );
    }

    #[tokio::test]
    async fn missing_purchase_renders_not_found_page() {
        let (state, user_id) = get_test_state();

        let response =
            get_purchase_detail_page(State(state), Extension(user_id), Path(1337)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
