//! Migration-file lifecycle: numbering, destructive-operation policy, and
//! the writer that assembles forward/reverse scripts for the goose runner.

pub mod destructive;
pub mod numbering;
pub mod writer;
