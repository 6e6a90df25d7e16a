//! Alert fragments for displaying success and error messages to users.
//!
//! Endpoints called via htmx return these fragments instead of full pages so
//! the message can be swapped into the alert container on the current page.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// Alert message types for styling
#[derive(Debug, Clone)]
pub enum AlertType {
    Success,
    Error,
}

/// An alert message with a short headline and optional details.
pub struct Alert<'a> {
    pub alert_type: AlertType,
    pub message: &'a str,
    pub details: &'a str,
}

impl<'a> Alert<'a> {
    /// Create a new success alert
    #[allow(dead_code)]
    pub fn success(message: &'a str, details: &'a str) -> Self {
        Self {
            alert_type: AlertType::Success,
            message,
            details,
        }
    }

    /// Create a new error alert
    pub fn error(message: &'a str, details: &'a str) -> Self {
        Self {
            alert_type: AlertType::Error,
            message,
            details,
        }
    }

    pub fn into_markup(self) -> Markup {
        let (container_style, icon) = match self.alert_type {
            AlertType::Success => (
                "flex items-start gap-3 p-4 mb-4 rounded-lg border \
                text-green-800 border-green-300 bg-green-50 \
                dark:bg-gray-800 dark:text-green-400 dark:border-green-800",
                "✓",
            ),
            AlertType::Error => (
                "flex items-start gap-3 p-4 mb-4 rounded-lg border \
                text-red-800 border-red-300 bg-red-50 \
                dark:bg-gray-800 dark:text-red-400 dark:border-red-800",
                "!",
            ),
        };

        html! {
            div class=(container_style) role="alert"
            {
                span class="font-bold" aria-hidden="true" { (icon) }

                div
                {
                    p class="font-medium" { (self.message) }

                    @if !self.details.is_empty() {
                        p class="text-sm" { (self.details) }
                    }
                }
            }
        }
    }
}

/// Render an alert fragment with the given status code.
pub fn render_alert(status_code: StatusCode, alert: Alert) -> Response {
    (status_code, alert.into_markup()).into_response()
}
