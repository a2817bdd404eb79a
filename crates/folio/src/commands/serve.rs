//! `folio serve` command implementation.

use std::sync::Arc;

use clap::Args;
use folio_config::CliSettings;
use folio_server::{run_server, server_config_from_folio_config};

use super::{CommonArgs, page_resolver};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.common.load_config(CliSettings {
            host: self.host,
            port: self.port,
            ..CliSettings::default()
        })?;

        output.info(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!("Backend: {}", config.backend.base_url));
        output.info(&format!("Revalidate: {}s", config.site.revalidate_secs));
        if config.preview.is_some() {
            output.info("Preview: enabled");
        } else {
            output.info("Preview: disabled (no [preview] in config)");
        }

        let resolver = Arc::new(page_resolver(&config)?);
        let server_config = server_config_from_folio_config(&config, version.to_owned());
        run_server(server_config, resolver)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}
