//! Record-oriented access to Google Sheets, authenticated as a service account.
//!
//! [`mapper::RowMapper`] turns header-aligned sheet rows into field-keyed records and back.
//! It talks to the spreadsheet through [`sheets::SheetOperations`], implemented over HTTP by
//! [`sheets::SheetsClient`], which signs JWT-bearer assertions and caches the resulting
//! access token ([`auth`]).

pub mod auth;
pub mod config;
pub mod error;
pub mod mapper;
pub mod models;
pub mod sheets;

pub use error::{AppError, Result};
