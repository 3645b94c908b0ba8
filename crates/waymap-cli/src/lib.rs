//! waymap CLI library.
//!
//! Command handlers, logging setup and output formatting for the `waymap-cli`
//! binary. Handlers are generic over the routing backend so they can be
//! exercised without a running service.

pub mod commands;
pub mod logging;
pub mod output;
pub mod surface;
