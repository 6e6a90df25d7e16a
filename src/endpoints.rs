//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/purchases/{purchase_id}', use
//! [format_endpoint].

/// The root route which displays the landing page.
pub const ROOT: &str = "/";
/// The landing page for logged in users, listing their purchases.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for displaying a single purchase.
pub const PURCHASE_VIEW: &str = "/purchases/{purchase_id}";
/// The page for editing an existing purchase.
pub const EDIT_PURCHASE_VIEW: &str = "/purchases/{purchase_id}/edit";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The route for instructions for resetting the user's password.
pub const FORGOT_PASSWORD_VIEW: &str = "/forgot_password";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for checking that the server is up.
pub const HEALTH: &str = "/api/health";
/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to create users.
pub const USERS: &str = "/api/users";
/// The route to list and create purchases.
pub const PURCHASES_API: &str = "/api/purchases";
/// The route to update or delete a single purchase.
pub const PURCHASE_API: &str = "/api/purchases/{purchase_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/purchases/{purchase_id}',
/// '{purchase_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
