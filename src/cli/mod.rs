pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, DetectArgs, PlanArgs, ProvidersArgs, ScanArgs};
pub use handlers::{handle_detect, handle_plan, handle_providers};
pub use output::{OutputFormat, OutputFormatter, ProviderInfo};
