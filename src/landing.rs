//! The landing page shown to visitors who are not logged in.

use axum::response::{IntoResponse, Response};
use maud::html;

use crate::{endpoints, html::base};

/// Renders the landing page with links to log in or create an account.
pub async fn get_landing_page() -> Response {
    let content = html! {
        div class="min-h-screen flex items-center justify-center px-4"
        {
            div class="max-w-md w-full space-y-8 text-center text-gray-900 dark:text-white"
            {
                h1 class="text-4xl font-extrabold mb-4" { "EasyCeipt" }

                div class="space-y-2 mb-8 text-lg text-gray-600 dark:text-gray-300"
                {
                    p { "Need to track organization expenses?" }
                    p { "Need to check your purchases at a moment's notice?" }
                    p { "Welcome to EasyCeipt!" }
                }

                div class="flex justify-center space-x-4"
                {
                    a
                        href=(endpoints::LOG_IN_VIEW)
                        class="inline-block px-6 py-3 text-base font-semibold text-blue-600
                            bg-transparent border border-blue-600 rounded-lg hover:bg-blue-50
                            dark:hover:bg-gray-800"
                    {
                        "Login"
                    }

                    a
                        href=(endpoints::REGISTER_VIEW)
                        class="inline-block px-6 py-3 text-base font-semibold text-white
                            bg-blue-600 border border-blue-600 rounded-lg hover:bg-blue-700"
                    {
                        "Create an Account"
                    }
                }
            }
        }
    };

    base("Welcome", &[], &content).into_response()
}
