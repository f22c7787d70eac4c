pub mod collect;
pub mod commands;
pub mod mitresync;
pub mod scan;
pub mod serve;
pub mod validate;

pub use commands::{Cli, Commands};
