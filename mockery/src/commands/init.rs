use std::path::{Path, PathBuf};

use clap::Args;
use eyre::{Context, Result};
use mockery_config::{Config, PackageConfig, RootConfig};
use mockery_core::{GeneratedFile, Overwrite};

#[derive(Args)]
pub struct InitCommand {
    /// Import path of the Go package to mock
    pub module: String,

    /// Directory to write .mockery.yaml into
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,
}

impl InitCommand {
    pub fn run(&self) -> Result<()> {
        let path = write_seed(&self.module, &self.output)?;
        println!("Created {}", path.display());
        println!();
        println!("Next steps:");
        println!("  mockery showconfig");
        println!("  mockery");
        Ok(())
    }
}

/// The seed config: every interface of `module`, testify mocks next to it.
fn seed(module: &str) -> RootConfig {
    let mut root = RootConfig {
        config: Config {
            all: Some(true),
            dir: Some("{{.InterfaceDir}}".to_string()),
            filename: Some("mocks_test.go".to_string()),
            pkgname: Some("{{.SrcPackageName}}".to_string()),
            structname: Some("{{.Mock}}{{.InterfaceName}}".to_string()),
            template: Some("testify".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    root.packages
        .insert(module.to_string(), PackageConfig::default());
    root
}

fn write_seed(module: &str, dir: &Path) -> Result<PathBuf> {
    let yaml = serde_yaml::to_string(&seed(module)).wrap_err("Failed to encode config")?;
    let file = GeneratedFile::new(dir.join(".mockery.yaml"), yaml);
    file.write(Overwrite::Never)
        .wrap_err("Refusing to replace the existing config")?;
    Ok(file.path().to_path_buf())
}
