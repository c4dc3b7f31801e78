//! Domain layer containing the dialog engine and the order it runs.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, locale, timestamps, errors)
//! - `form` - Guided form-filling dialog engine
//! - `order` - Static declaration of the Stardust coffee order

pub mod form;
pub mod foundation;
pub mod order;
