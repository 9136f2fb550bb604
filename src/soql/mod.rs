//! SOQL text: qualifiers, WHERE translation, SELECT building.

mod builder;
mod filter;
pub mod qual;

pub use builder::*;
pub use filter::translate;
pub use qual::*;
