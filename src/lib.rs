//! D&B Direct+ utilities library
//!
//! Fetches D&B Direct+ products for lists of DUNS and flattens the
//! returned data blocks documents into pipe-delimited rows.
//!
//! # Modules
//!
//! - `models`, `navigate`: the data blocks document and safe path lookups.
//! - `cell`, `header`: output cells and column labels.
//! - `address`, `registration_numbers`, `reformat`, `industry_codes`,
//!   `employees`, `financials`, `linkage`: the field selectors.
//! - `reference_tables`: D&B to ECB lookup tables.
//! - `layout`: the AnaCredit and general column plans.
//! - `identity_resolution`: cleanseMatch response rows.
//! - `processing`: directory and database flattening drivers.
//! - `input`, `dnb_client`, `enrichment`: fetching and persisting responses.
//! - `db`, `db_storage`: Postgres pool and the `products_dnb` table.
//! - `reference_data`: reference data listings.
//! - `config`, `errors`: configuration and error types.

pub mod address;
pub mod cell;
pub mod config;
pub mod db;
pub mod db_storage;
pub mod dnb_client;
pub mod employees;
pub mod enrichment;
pub mod errors;
pub mod financials;
pub mod header;
pub mod identity_resolution;
pub mod industry_codes;
pub mod input;
pub mod layout;
pub mod linkage;
pub mod models;
pub mod navigate;
pub mod processing;
pub mod reference_data;
pub mod reference_tables;
pub mod reformat;
pub mod registration_numbers;
