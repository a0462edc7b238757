mod error;
mod join_key;
mod row;

pub use error::*;
pub use join_key::{JoinKey, JoinKeyBuilder};
pub use row::{Row, RowBuilder, RowValue};

// Re-export the oxrdf variable types.
pub use oxrdf::{Variable, VariableNameParseError, VariableRef};
