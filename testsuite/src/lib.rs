//! Test harness for the Quack join operators.
//!
//! Join fixtures are written in a small s-expression format (see [parse_table]). A
//! [JoinTestCase] runs a join with every algorithm and configuration and compares the results,
//! as multisets, with an expected [RowBag].

mod bag;
mod case;
mod random;
mod table;

pub use bag::{format_diff, RowBag};
pub use case::JoinTestCase;
pub use random::RandomTableGenerator;
pub use table::{parse_key, parse_table, parse_variable};
