//! One handler per subcommand

pub mod log;
pub mod plan;
pub mod run;
pub mod sample;
pub mod sheets;
pub mod validate;
