//! The dashboard page listing the authenticated user's purchases.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::OffsetDateTime;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    AppState, Error,
    auth::{UserID, get_user_by_id},
    endpoints,
    html::{
        BADGE_STYLE, BUTTON_PRIMARY_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, dollar_input_styles, format_currency,
        loading_spinner,
    },
    navigation::NavBar,
    purchase::{
        Purchase, get_purchases_for_owner,
        form::{PurchaseFormDefaults, purchase_form_fields},
    },
    timezone::get_local_offset,
};

/// The max number of graphemes to display in the purchase table rows before
/// truncating and displaying ellipses.
const MAX_DESCRIPTION_GRAPHEMES: usize = 32;

/// The state needed for the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for accessing purchases.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the dashboard page with the user's purchases and the form for
/// logging a new purchase.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_dashboard_page(
    State(state): State<DashboardPageState>,
    Extension(user_id): Extension<UserID>,
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

    let purchases = match get_purchases_for_owner(user.email.as_str(), &connection) {
        Ok(purchases) => purchases,
        Err(error) => {
            tracing::error!("Failed to retrieve purchases for {}: {error}", user.email);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load purchases")
                .into_response();
        }
    };

    let local_offset = match get_local_offset(&state.local_timezone) {
        Some(offset) => offset,
        None => return Error::InvalidTimezoneError(state.local_timezone).into_response(),
    };
    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();

    let form_defaults = PurchaseFormDefaults {
        trans_date: today,
        vendor: None,
        tot_amount: None,
        tax: false,
        description: None,
        max_date: today,
    };

    dashboard_view(&purchases, &form_defaults).into_response()
}

fn dashboard_view(purchases: &[Purchase], form_defaults: &PurchaseFormDefaults<'_>) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-4xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Dashboard" }

                    // Updated client-side as rows are selected, see app.js.
                    span
                        id="selected-count"
                        class="text-sm text-gray-500 dark:text-gray-400"
                    {}
                }

                details class="rounded bg-gray-50 dark:bg-gray-800 p-4"
                {
                    summary class="cursor-pointer font-medium" { "Log New Purchase" }

                    (new_purchase_form(form_defaults))
                }

                section class="rounded bg-gray-50 dark:bg-gray-800 overflow-hidden"
                {
                    table class="w-full my-2 text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class="px-6 py-3"
                                {
                                    span class="sr-only" { "Select" }
                                }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Vendor" }
                                th scope="col" class="px-6 py-3 text-right" { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for purchase in purchases {
                                (purchase_row_view(purchase))
                            }

                            @if purchases.is_empty() {
                                tr
                                {
                                    td
                                        colspan="6"
                                        data-empty-state="true"
                                        class="px-6 py-4 text-center"
                                    {
                                        "No purchases yet."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Dashboard", &[dollar_input_styles()], &content)
}

fn new_purchase_form(defaults: &PurchaseFormDefaults<'_>) -> Markup {
    html! {
        form
            hx-post=(endpoints::PURCHASES_API)
            hx-indicator="#indicator"
            hx-target-4xx="#alert-container"
            hx-target-5xx="#alert-container"
            class="mt-4 space-y-4 md:space-y-6"
        {
            (purchase_form_fields(defaults))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Add Purchase"
            }
        }
    }
}

fn purchase_row_view(purchase: &Purchase) -> Markup {
    let amount_str = format_currency(purchase.tot_amount);
    let (description, tooltip) = format_description(&purchase.description);
    let view_url = endpoints::format_endpoint(endpoints::PURCHASE_VIEW, purchase.id);

    html! {
        tr class=(TABLE_ROW_STYLE) data-purchase-row="true"
        {
            td class=(TABLE_CELL_STYLE)
            {
                input
                    type="checkbox"
                    data-select-purchase=(purchase.id)
                    aria-label="Select purchase"
                    class="rounded-xs";
            }
            td class=(TABLE_CELL_STYLE) { time datetime=(purchase.trans_date) { (purchase.trans_date) } }
            td class=(TABLE_CELL_STYLE) { (purchase.vendor) }
            td class="px-6 py-4 text-right"
            {
                (amount_str)

                @if purchase.tax {
                    " "
                    span class=(BADGE_STYLE) { "Tax paid" }
                }
            }
            td class=(TABLE_CELL_STYLE) title=[tooltip] { (description) }
            td class=(TABLE_CELL_STYLE)
            {
                a href=(view_url) class=(LINK_STYLE) { "View" }
            }
        }
    }
}

/// Truncate long descriptions for display in the table, returning the display
/// string and the full text as a tooltip when truncation happened.
fn format_description(description: &str) -> (String, Option<String>) {
    let graphemes: Vec<&str> = description.graphemes(true).collect();

    if graphemes.len() <= MAX_DESCRIPTION_GRAPHEMES {
        (description.to_owned(), None)
    } else {
        let truncated: String = graphemes[..MAX_DESCRIPTION_GRAPHEMES].concat();
        (format!("{truncated}…"), Some(description.to_owned()))
    }
}

#[cfg(test)]
mod dashboard_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State};
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        auth::{PasswordHash, create_user},
        db::initialize,
        endpoints,
        purchase::{Purchase, create_purchase},
        test_utils::{assert_status_ok, assert_valid_html, must_get_form, parse_html_document},
    };

    use super::{DashboardPageState, format_description, get_dashboard_page};

    const OWNER: &str = "foo@bar.baz";

    fn get_test_state() -> DashboardPageState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        DashboardPageState {
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    fn create_test_user(state: &DashboardPageState, email: &str) -> crate::auth::UserID {
        let connection = state.db_connection.lock().unwrap();
        create_user(
            email.parse().unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .expect("Could not create test user")
        .id
    }

    #[tokio::test]
    async fn dashboard_shows_create_form_with_required_fields() {
        let state = get_test_state();
        let user_id = create_test_user(&state, OWNER);

        let response = get_dashboard_page(State(state), Extension(user_id)).await;

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let form = must_get_form(&document);
        assert_eq!(
            form.value().attr("hx-post"),
            Some(endpoints::PURCHASES_API),
            "want purchase form posting to {}",
            endpoints::PURCHASES_API
        );

        for name in ["vendor", "trans_date", "tot_amount"] {
            let selector = Selector::parse(&format!("input[name={name}][required]")).unwrap();
            assert!(
                form.select(&selector).next().is_some(),
                "want required input named {name}"
            );
        }
    }

    #[tokio::test]
    async fn dashboard_lists_only_owned_purchases() {
        let state = get_test_state();
        let user_id = create_test_user(&state, OWNER);

        {
            let connection = state.db_connection.lock().unwrap();
            create_purchase(
                Purchase::build(date!(2025 - 10 - 05), "Joe's Hardware", 12.3, OWNER),
                &connection,
            )
            .unwrap();
            create_purchase(
                Purchase::build(
                    date!(2025 - 10 - 05),
                    "Someone Else's Vendor",
                    99.9,
                    "other@example.com",
                ),
                &connection,
            )
            .unwrap();
        }

        let response = get_dashboard_page(State(state), Extension(user_id)).await;

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let rows = select_purchase_rows(&document);
        assert_eq!(rows.len(), 1, "want 1 purchase row, got {}", rows.len());
        assert!(rows[0].contains("Joe's Hardware"));
        assert!(!document.html().contains("Someone Else's Vendor"));
    }

    #[tokio::test]
    async fn dashboard_shows_empty_state_without_purchases() {
        let state = get_test_state();
        let user_id = create_test_user(&state, OWNER);

        let response = get_dashboard_page(State(state), Extension(user_id)).await;

        let document = parse_html_document(response).await;
        let empty_selector = Selector::parse("td[data-empty-state=true]").unwrap();
        let empty_cell = document
            .select(&empty_selector)
            .next()
            .expect("expected the empty state cell");
        let text = empty_cell.text().collect::<String>();

        assert_eq!(text.trim(), "No purchases yet.");
    }

    #[tokio::test]
    async fn purchase_rows_have_client_only_select_checkboxes() {
        let state = get_test_state();
        let user_id = create_test_user(&state, OWNER);

        {
            let connection = state.db_connection.lock().unwrap();
            create_purchase(
                Purchase::build(date!(2025 - 10 - 05), "Joe's Hardware", 12.3, OWNER),
                &connection,
            )
            .unwrap();
        }

        let response = get_dashboard_page(State(state), Extension(user_id)).await;

        let document = parse_html_document(response).await;
        let checkbox_selector =
            Selector::parse("tr[data-purchase-row] input[type=checkbox]").unwrap();
        let checkboxes = document.select(&checkbox_selector).collect::<Vec<_>>();

        assert_eq!(checkboxes.len(), 1, "want a select checkbox per row");
        // The selection is client-only state, it must not be part of a form.
        for checkbox in checkboxes {
            assert!(
                checkbox.value().attr("data-select-purchase").is_some(),
                "want the checkbox to carry the purchase ID for app.js"
            );
        }
    }

    #[tokio::test]
    async fn tax_paid_badge_is_rendered_only_for_taxed_purchases() {
        let state = get_test_state();
        let user_id = create_test_user(&state, OWNER);

        {
            let connection = state.db_connection.lock().unwrap();
            create_purchase(
                Purchase::build(date!(2025 - 10 - 05), "Taxed Vendor", 10.0, OWNER).tax(true),
                &connection,
            )
            .unwrap();
            create_purchase(
                Purchase::build(date!(2025 - 10 - 04), "Untaxed Vendor", 10.0, OWNER),
                &connection,
            )
            .unwrap();
        }

        let response = get_dashboard_page(State(state), Extension(user_id)).await;

        let document = parse_html_document(response).await;
        let rows = select_purchase_rows(&document);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("Tax paid"), "taxed row should have badge");
        assert!(
            !rows[1].contains("Tax paid"),
            "untaxed row should not have badge"
        );
    }

    fn select_purchase_rows(document: &Html) -> Vec<String> {
        let row_selector = Selector::parse("tr[data-purchase-row]").unwrap();
        document
            .select(&row_selector)
            .map(|row| row.text().collect::<String>())
            .collect()
    }

    #[test]
    fn short_descriptions_are_not_truncated() {
        let (display, tooltip) = format_description("nails");

        assert_eq!(display, "nails");
        assert_eq!(tooltip, None);
    }

    #[test]
    fn long_descriptions_are_truncated_with_tooltip() {
        let description = "a very long description that goes on and on and on";

        let (display, tooltip) = format_description(description);

        assert!(display.ends_with('…'));
        assert_eq!(tooltip.as_deref(), Some(description));
    }
}
