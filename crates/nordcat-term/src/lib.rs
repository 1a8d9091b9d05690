//! # Nordcat Term
//!
//! Terminal output for classified tokens: the Nord palette and the renderers
//! that write ANSI-colored text or a JSON token dump.
//!
//! ## Learning: Trait Objects
//!
//! The document pipeline only sees `&mut dyn Renderer`, so the output format
//! is picked once at startup and nothing downstream needs to be generic over
//! it.

pub mod palette;
pub mod render;

pub use palette::{Color, Palette};
pub use render::{AnsiRenderer, JsonRenderer, RESET, Renderer};
