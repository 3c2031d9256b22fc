//! CLI domain: parse, route, output, and presentation only.
//! No pipeline logic; the route table dispatches to the builder and classifier.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::{map_error, EXIT_FATAL, EXIT_PARTIAL_FAILURE};
pub use parse::{Cli, Commands};
pub use presentation::{format_generate_summary, format_verify_summary, OutputFormat};
pub use route::{CommandOutput, RunContext};
