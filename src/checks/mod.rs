pub mod net;
mod root;

pub use root::RootChecker;
