//! HTTP handlers, grouped by the screen they serve.
//!
//! Admin handlers run behind `guard::require_admin` and receive the caller as an
//! `Extension<AdminActor>`; public and session handlers never fail on a missing or
//! invalid token.

pub mod admin;
pub mod auth;
pub mod blog;
pub mod case_studies;
pub mod components;
pub mod contacts;
pub mod pages;
pub mod public;
pub mod sections;
pub mod settings;
