//! Layer effects composited on top of the processed background.
//!
//! ## Overlay Effects
//! - **Texture Overlay** - Tiled texture blended at low opacity (`texture_overlay.rs`)

pub mod texture_overlay;
