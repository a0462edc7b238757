#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod model {
    pub use quack_model::*;
}

pub mod common {
    pub use quack_common::*;
}

pub mod physical {
    pub use quack_physical::*;
}

pub use quack_common::{QuackError, QuackResult};
