//! Check subcommand - apply wiring and print the inspection snapshot.

use std::path::PathBuf;

use clap::Parser;

use crate::config::WiringConfig;
use crate::injector::Injector;
use crate::reflection::Catalog;
use crate::store::{Category, Inspection};

/// Apply a wiring file to an empty injector and print its configuration.
#[derive(Parser)]
pub struct CheckCommand {
    /// Wiring file. Without it the layered user/project/env config is used.
    pub file: Option<PathBuf>,

    /// Only report configuration registered for this type.
    #[arg(short, long)]
    pub class: Option<String>,

    /// Categories to report (definitions, delegates, prepares, aliases,
    /// shares, all). Repeatable.
    #[arg(long = "category")]
    pub category: Vec<Category>,
}

impl CheckCommand {
    /// Selected categories, all of them when none is given.
    pub fn categories(&self) -> Category {
        self.category
            .iter()
            .copied()
            .reduce(|acc, category| acc | category)
            .unwrap_or_default()
    }

    /// Run the check command.
    pub fn run(self) -> color_eyre::Result<()> {
        let inspection = self.inspect()?;
        println!("{}", serde_json::to_string_pretty(&inspection)?);
        Ok(())
    }

    fn inspect(&self) -> color_eyre::Result<Inspection> {
        let config = match &self.file {
            Some(path) => {
                tracing::info!("Loading wiring from {}", path.display());
                WiringConfig::load_from(path)?
            }
            None => WiringConfig::load()?,
        };

        let mut injector = Injector::new(Catalog::new());
        config.apply(&mut injector)?;

        let categories = self.categories();
        tracing::debug!(%categories, class = ?self.class, "Inspecting wiring");
        Ok(injector.inspect(self.class.as_deref(), categories))
    }
}
