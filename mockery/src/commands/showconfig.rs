use clap::Args;
use eyre::{Context, Result};
use mockery_go::{GoLoader, PackageLoader};

use super::GlobalArgs;

#[derive(Args)]
pub struct ShowConfigCommand {}

impl ShowConfigCommand {
    /// Print the config after merging and recursive expansion.
    pub fn run(&self, global: &GlobalArgs) -> Result<()> {
        let cwd = std::env::current_dir().wrap_err("Failed to get current directory")?;
        let loaded = global.load(&cwd);

        let build_tags = loaded.root.config.build_tags();
        let loader = GoLoader::new(&cwd, &build_tags).wrap_err("Failed to locate the Go module")?;
        let resolved = loaded
            .root
            .resolve(|path| loader.list_subpackages(path))
            .wrap_err("Failed to resolve config")?;

        let yaml = serde_yaml::to_string(resolved.as_root()).wrap_err("Failed to encode config")?;
        print!("{yaml}");
        Ok(())
    }
}
