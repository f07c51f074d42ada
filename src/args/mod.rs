//! Command-line argument parsing and handling.

pub mod definition;
pub mod output;
pub mod repos;
pub mod updates;
pub mod utils;

use std::fmt;
use std::sync::Arc;

use hostupd::app::{HostUpdatePage, RunError};
use hostupd::config::Settings;
use hostupd::gateway::{GatewayError, HttpGateway};
use tokio::sync::mpsc;

// Re-export commonly used items
pub use definition::{Args, Command, UpdatesCommand};
pub use utils::determine_log_level;

/// What: Failure of a CLI command, mapped to a non-zero exit.
#[derive(Debug)]
pub enum CliError {
    /// Bad command-line input.
    Usage(String),
    /// The host does not offer the named feature.
    Unsupported(&'static str),
    /// Remote call failed.
    Gateway(GatewayError),
    /// Run could not be prepared or started.
    Run(RunError),
    /// The command ran but did not succeed.
    Failed(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage(msg) | Self::Failed(msg) => write!(f, "{msg}"),
            Self::Unsupported(what) => write!(f, "{what} is not available on this host"),
            Self::Gateway(e) => write!(f, "{e}"),
            Self::Run(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<GatewayError> for CliError {
    fn from(value: GatewayError) -> Self {
        Self::Gateway(value)
    }
}

impl From<RunError> for CliError {
    fn from(value: RunError) -> Self {
        match value {
            RunError::Gateway(e) => Self::Gateway(e),
            other => Self::Run(other),
        }
    }
}

/// What: Run the selected command against the configured panel.
///
/// Inputs:
/// - `args`: Parsed command line.
/// - `settings`: Settings with command-line overrides applied.
///
/// Output:
/// - `Ok(())` on success, the first error otherwise.
///
/// # Errors
/// - Any [`CliError`] raised by the command.
///
/// Details:
/// - Run events are printed by a separate task that ends once the page is dropped.
pub async fn dispatch(args: &Args, settings: &Settings) -> Result<(), CliError> {
    let gateway = Arc::new(HttpGateway::new(&settings.server_url, settings.request_timeout())?);
    let assume_yes = args.yes || settings.assume_yes;

    let (tx, rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(output::print_events(rx));
    let mut page = HostUpdatePage::open(Arc::clone(&gateway), settings, tx).await;

    let result = match &args.command {
        Command::Capabilities => {
            output::print_capabilities(&page);
            Ok(())
        }
        Command::Repos { action } => repos::handle(&page, action, assume_yes).await,
        Command::Updates {
            action: UpdatesCommand::List,
        } => updates::handle_list(gateway.as_ref()).await,
        Command::Update { packages } => updates::handle_update(&page, packages, assume_yes).await,
        Command::UpdateAll => updates::handle_update_all(&page, assume_yes).await,
        Command::Resume => updates::handle_resume(&page).await,
    };

    page.teardown();
    drop(page);
    if let Err(e) = printer.await {
        tracing::warn!(error = %e, "event printer stopped abnormally");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Gateway errors inside run errors surface as gateway errors.
    fn run_error_unwraps_gateway_error() {
        let err: CliError = RunError::Gateway(GatewayError::Decode("bad".into())).into();
        assert!(matches!(err, CliError::Gateway(GatewayError::Decode(_))));
        let err: CliError = RunError::AlreadyRunning.into();
        assert_eq!(err.to_string(), "an update run is already active");
    }
}
