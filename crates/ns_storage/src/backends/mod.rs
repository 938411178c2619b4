pub mod file;
pub mod memory;

pub use file::{FileConfig, FileStorage};
pub use memory::MemoryStorage;
