//! `folio paths` command implementation.

use clap::Args;
use folio_config::CliSettings;

use super::{CommonArgs, page_resolver};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the paths command.
#[derive(Args)]
pub(crate) struct PathsArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Print the path list as JSON.
    #[arg(long)]
    json: bool,
}

impl PathsArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.common.load_config(CliSettings::default())?;
        let resolver = page_resolver(&config)?;

        let Some(list) = resolver.list_paths() else {
            output.warning("Path enumeration failed, no static paths");
            return Ok(());
        };

        if self.json {
            output.result(&serde_json::to_string_pretty(&list)?);
            return Ok(());
        }

        let multilingual = config.site.is_multilingual();
        for path in &list.paths {
            let route = if multilingual {
                format!("/{}{}{}", path.locale, config.content.listing_path, path.segments)
            } else {
                format!("{}{}", config.content.listing_path, path.segments)
            };
            output.result(&route);
        }
        output.success(&format!("{} paths", list.paths.len()));
        Ok(())
    }
}
