//! `folio build` command implementation.

use std::path::PathBuf;

use clap::Args;
use folio_config::CliSettings;
use folio_render::{BuildConfig, StaticSiteBuilder};
use folio_server::site_meta_from_folio_config;

use super::{CommonArgs, page_resolver};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Output directory for the generated site (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.common.load_config(CliSettings {
            output_dir: self.output_dir,
            ..CliSettings::default()
        })?;
        let output_dir = config.build_resolved.output_dir.clone();

        output.info(&format!("Backend: {}", config.backend.base_url));
        output.info(&format!("Locales: {}", config.site.locales.join(", ")));
        output.info(&format!("Output: {}", output_dir.display()));

        let resolver = page_resolver(&config)?;
        let build_config = BuildConfig {
            output_dir: output_dir.clone(),
            site: site_meta_from_folio_config(&config),
        };
        let report = StaticSiteBuilder::new(&resolver, build_config).build()?;

        if report.written.is_empty() {
            output.warning("No pages were generated");
        } else {
            output.success(&format!(
                "Built {} pages to {}",
                report.written.len(),
                output_dir.display()
            ));
        }
        Ok(())
    }
}
