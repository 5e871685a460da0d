mod package;
pub mod rules;

pub use package::PackageManager;
