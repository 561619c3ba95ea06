//! Data models for the Zentura site.
//!
//! Field names match the dashboard's JSON shape; hosted-table rows have their own types.

mod content;
mod image;
mod message;
mod session;
mod trip;

pub use content::*;
pub use image::*;
pub use message::*;
pub use session::*;
pub use trip::*;
