//! Table schemas: column types, derivation from describe metadata, merging, table definitions.

mod derive;
mod merge;
mod table;
pub mod types;

pub use derive::*;
pub use merge::merge_columns;
pub use table::*;
pub use types::*;
