//! Concrete [`DataSource`](crate::source::DataSource) implementations and the
//! text formats they read.

pub mod file;
pub mod memory;
pub mod process;
pub mod text;

pub use file::FileSource;
pub use memory::MemorySource;
pub use process::{ProcessSource, ProcessSourceConfig};
