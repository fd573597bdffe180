//! Command implementations for the gizi CLI

mod lookup;
mod render;
mod settings;

pub use lookup::*;
pub use settings::*;
