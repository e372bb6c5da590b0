//! CLI argument types and parsers.
mod cli;
mod parsers;
mod types;


pub use cli::ProbeArgs;
pub(crate) use parsers::{parse_bool_env, parse_duration_arg};
pub use types::{HttpMethod, PositiveU64, PositiveUsize, ScenarioKind};
