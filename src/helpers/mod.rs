//! Formatting helpers
//!
//! Pure functions that turn raw catalog values (dates, untrusted strings,
//! source references) into display-safe text.

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
