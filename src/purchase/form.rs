//! The shared form fields for creating and editing purchases.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE};

/// The form data submitted when creating or editing a purchase.
///
/// The `tax` value comes from a checkbox, so it either has a string value or
/// is not set. The `Some` variant should be interpreted as `true` irregardless
/// of the string value, and the `None` variant should be interpreted as
/// `false`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PurchaseFormData {
    pub trans_date: Date,
    pub vendor: String,
    pub tot_amount: f64,
    #[serde(default)]
    pub tax: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl PurchaseFormData {
    /// Whether the tax checkbox was ticked.
    pub fn tax_paid(&self) -> bool {
        self.tax.is_some()
    }
}

/// Default values to pre-fill the purchase form fields with.
pub struct PurchaseFormDefaults<'a> {
    pub trans_date: Date,
    pub vendor: Option<&'a str>,
    pub tot_amount: Option<f64>,
    pub tax: bool,
    pub description: Option<&'a str>,
    pub max_date: Date,
}

pub fn purchase_form_fields(defaults: &PurchaseFormDefaults<'_>) -> Markup {
    let amount_str = defaults.tot_amount.map(|amount| format!("{amount:.2}"));
    let vendor_placeholder = defaults.vendor.unwrap_or("Vendor");
    let description_placeholder = defaults.description.unwrap_or("Description");

    html! {
        div
        {
            label
                for="vendor"
                class=(FORM_LABEL_STYLE)
            {
                "Vendor"
            }

            input
                name="vendor"
                id="vendor"
                type="text"
                placeholder=(vendor_placeholder)
                value=[defaults.vendor]
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="trans_date"
                class=(FORM_LABEL_STYLE)
            {
                "Date"
            }

            input
                name="trans_date"
                id="trans_date"
                type="date"
                max=(defaults.max_date)
                value=(defaults.trans_date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="tot_amount"
                class=(FORM_LABEL_STYLE)
            {
                "Amount"
            }

            div class="input-wrapper w-full"
            {
                input
                    name="tot_amount"
                    id="tot_amount"
                    type="number"
                    step="0.01"
                    min="0"
                    placeholder=(amount_str.as_deref().unwrap_or("0.00"))
                    value=[amount_str.as_deref()]
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div class="flex items-center gap-x-3"
        {
            input
                type="checkbox"
                name="tax"
                id="tax"
                checked[defaults.tax]
                tabindex="0"
                class="rounded-xs";

            label
                for="tax"
                class=(FORM_LABEL_STYLE)
            {
                "Sales tax was charged on this purchase"
            }
        }

        div
        {
            label
                for="description"
                class=(FORM_LABEL_STYLE)
            {
                "Description"
            }

            input
                name="description"
                id="description"
                type="text"
                placeholder=(description_placeholder)
                value=[defaults.description]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}
