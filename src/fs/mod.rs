//! Filesystem seam and the project context handed to providers

mod mock;
mod project;
mod real;
mod r#trait;

pub use mock::MockFileSystem;
pub use project::{LocalProject, ProjectContext, MAX_READ_BYTES};
pub use r#trait::{EntryKind, EntryMetadata, FileSystem};
pub use real::RealFileSystem;
