//! Contains the join operators of Quack.
//!
//! Every operator joins two [RowList](quack_common::RowList)s under a
//! [JoinKey](quack_model::JoinKey) and produces the same multiset of rows. The operators differ
//! in their requirements and costs:
//!
//! - [NestedLoopJoin](join::NestedLoopJoin) compares every pair of rows and is the reference
//!   implementation.
//! - [HashJoin](join::HashJoin) indexes one side by a key-aware [RowHasher](join::RowHasher).
//! - [MergeJoin](join::MergeJoin) merges two inputs that are sorted by a
//!   [RowOrder](join::RowOrder).
//!
//! [JoinEngine] executes a join according to a [JoinConfiguration].

mod config;
mod engine;
pub mod join;

pub use config::{BuildSide, JoinAlgorithm, JoinConfiguration, JoinType, UnsortedInputPolicy};
pub use engine::JoinEngine;
