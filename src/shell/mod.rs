mod client;
mod quote;

pub use client::ShellClient;
pub use quote::shell_quote;
