//! The Stardust coffee order: menu options, prices and the static
//! declaration of its dialog.

mod form;
mod options;

pub use form::{
    build_order_form, confirms, fields, order_fields, order_form_builder, order_total_cents,
    text_ids, OrderTexts, ORDER_FORM_NAME, PHONE_PATTERN,
};
pub use options::{format_price, Coffee, Size, Sugar, Temperature, Topping};
