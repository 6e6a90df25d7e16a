//! A static page describing how to reset a forgotten password.

use axum::response::{IntoResponse, Response};
use maud::html;

use crate::{
    endpoints,
    html::{base, link},
};

/// Renders a page describing how the user's password can be reset.
pub async fn get_forgot_password_page() -> Response {
    let content = html! {
        div class="flex flex-col items-center justify-center px-6 py-8 mx-auto max-w-md text-gray-900 dark:text-white"
        {
            h1 class="text-xl font-bold leading-tight tracking-tight md:text-2xl mb-4"
            {
                "Forgot your password?"
            }

            p class="mb-4"
            {
                "EasyCeipt does not send password reset emails. Ask the person \
                running this server to reset the password column for your \
                account, then register the account again."
            }

            p { (link(endpoints::LOG_IN_VIEW, "Back to log in")) }
        }
    };

    base("Forgot Password", &[], &content).into_response()
}
