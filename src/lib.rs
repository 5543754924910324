//! rhsecq is a command-line client for the Red Hat Security Data API.
//! It searches and retrieves CVE records and presents them either as
//! compact plain-text reports or as raw JSON, on the terminal or on a
//! pastebin.

pub mod api;
pub mod application;
pub mod errors;
pub mod models;
pub mod query;
pub mod render;
pub mod text;
pub mod writers;
