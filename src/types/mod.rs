// Shared domain types: used by the GitHub adapter, the agent adapter, and
// the use cases. None of them performs I/O.

pub mod common;
pub mod execution;
pub mod labels;
pub mod project;
pub mod result;

pub use common::*;
pub use execution::*;
pub use labels::*;
pub use project::*;
pub use result::*;
