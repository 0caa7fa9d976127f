pub mod system_git;

pub use system_git::{SystemGit, filter_by_extension, strip_prefix};
