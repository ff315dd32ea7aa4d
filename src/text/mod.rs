//! Artist/title overlay: font resolution, shaping and layout.

pub mod builtin;
pub mod fonts;
pub mod layout;
pub mod shaper;
