pub mod changelog;
pub mod compiler;
mod files;
pub mod project;
pub mod table;

pub use changelog::{Changelog, ChangelogEntry};
pub use compiler::{compile, CompileError, Format};
pub use files::{copy_assets, LocalFiles};
pub use project::{BuildError, Built, LoadError, Project};
pub use table::{read_requirements, read_structure, TableError};
