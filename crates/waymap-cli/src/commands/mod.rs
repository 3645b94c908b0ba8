//! One module per subcommand. `main.rs` parses arguments and hands off here.

pub mod route;
pub mod strategies;
pub mod ways;
