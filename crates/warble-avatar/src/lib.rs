//! Warble Avatar Renderer
//!
//! Draws a single uppercase letter in white on a solid background and
//! encodes the result as PNG. The background is drawn from a fixed
//! five-colour palette, either at random per render or keyed by the letter.
//!
//! Glyphs come from a built-in 5x7 bitmap font, so rendering needs no
//! font files on disk.

pub mod glyphs;
pub mod render;

pub use render::{AvatarError, AvatarGenerator, PALETTE, PaletteMode};
