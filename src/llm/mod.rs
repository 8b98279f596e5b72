pub mod client;
pub mod prompts;
pub mod types;

pub use client::*;
pub use prompts::*;
pub use types::*;
