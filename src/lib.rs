//! Stardust Bot - Coffee ordering over a guided form-filling dialog.
//!
//! The dialog engine in `domain::form` compiles field declarations (static
//! or from a schema document) into immutable dialogs and runs one session
//! per conversation. `domain::order` declares the Stardust coffee order.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
