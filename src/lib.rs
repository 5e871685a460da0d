pub mod checks;
pub mod core;
pub mod pm;
pub mod shell;
pub mod su;
