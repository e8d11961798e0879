//! One module per subcommand.

pub mod config_cmd;
pub mod open;
pub mod peek;
pub mod send;
pub mod serve;
