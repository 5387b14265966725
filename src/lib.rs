//! Admin core for a personal portfolio site
//!
//! Signs and streams image uploads straight to the media host, attaches the
//! resulting URLs to hero, about, gallery, service, and award records, and
//! gates all of it behind a persisted operator session.

pub mod app;
pub mod content;
pub mod editor;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod session;
pub mod upload;

pub use error::{Error, Result};
