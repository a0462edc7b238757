pub mod error;
mod row_lib;
mod row_list;

pub use error::{InternalError, QuackError};
pub use row_lib::*;
pub use row_list::{merge_variables, RowIterator, RowList, RowListBuilder, RowListIntoIter};

pub type QuackResult<T> = Result<T, QuackError>;
