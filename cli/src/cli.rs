//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use notewell_core::ImportSettings;

#[derive(Parser, Debug)]
#[command(name = "notewell")]
#[command(about = "Import text, markdown and PDF files into a notes vault")]
#[command(version)]
pub struct Args {
    /// Settings file (JSON). Defaults to the user config directory.
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Print debug messages
    #[arg(long, global = true)]
    pub debug: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import files into a vault
    Import {
        /// Vault directory receiving the notes
        #[arg(long)]
        vault: PathBuf,

        #[command(flatten)]
        overrides: SettingsOverrides,

        /// Print the run log note when the import finishes
        #[arg(long)]
        show_log: bool,
    },
    /// Validate settings and print the resolved configuration
    Check {
        #[command(flatten)]
        overrides: SettingsOverrides,
    },
    /// List past import logs in a vault, newest first
    Logs {
        #[arg(long)]
        vault: PathBuf,

        /// Vault folder holding the runs (defaults to the settings value)
        #[arg(long)]
        destination: Option<String>,
    },
}

/// Flags that override values from the settings file.
#[derive(ClapArgs, Debug, Default, Clone)]
pub struct SettingsOverrides {
    /// Directory to import from
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Comma-separated extensions (txt, md, pdf)
    #[arg(long)]
    pub extensions: Option<String>,

    /// Child folder levels to descend into; -1 for unlimited
    #[arg(long, allow_hyphen_values = true)]
    pub depth: Option<i64>,

    /// Preview only: write nothing but the run log
    #[arg(long, conflicts_with = "no_dry_run")]
    pub dry_run: bool,

    /// Actually create notes
    #[arg(long)]
    pub no_dry_run: bool,

    /// Put every note directly in the run folder
    #[arg(long)]
    pub flat: bool,

    /// Prefix for note file names
    #[arg(long)]
    pub prefix: Option<String>,

    /// Comma-separated tags added to every note
    #[arg(long)]
    pub tags: Option<String>,

    #[arg(long)]
    pub max_tags: Option<usize>,

    /// Skip files larger than this many MB
    #[arg(long)]
    pub max_size_mb: Option<u64>,

    /// Vault folder receiving run folders
    #[arg(long)]
    pub destination: Option<String>,

    /// Link occurrences of other imported notes' titles
    #[arg(long)]
    pub links: bool,

    #[arg(long)]
    pub no_urls: bool,

    #[arg(long)]
    pub no_tags: bool,

    #[arg(long)]
    pub no_metadata: bool,

    /// Resolve file owners
    #[arg(long)]
    pub extended_metadata: bool,
}

impl SettingsOverrides {
    /// Apply the given flags on top of `settings`.
    pub fn apply(&self, settings: &mut ImportSettings) {
        if let Some(source) = &self.source {
            settings.import_directory = Some(source.clone());
        }
        if let Some(extensions) = &self.extensions {
            settings.file_extensions = extensions.clone();
        }
        if let Some(depth) = self.depth {
            settings.max_recursion_depth = depth;
        }
        if self.dry_run {
            settings.dry_run = true;
        }
        if self.no_dry_run {
            settings.dry_run = false;
        }
        if self.flat {
            settings.replicate_folder_structure = false;
        }
        if let Some(prefix) = &self.prefix {
            settings.file_prefix = prefix.clone();
        }
        if let Some(tags) = &self.tags {
            settings.global_tags = tags.clone();
        }
        if let Some(max_tags) = self.max_tags {
            settings.max_tags = max_tags;
        }
        if let Some(max_size_mb) = self.max_size_mb {
            settings.max_file_size_mb = max_size_mb;
        }
        if let Some(destination) = &self.destination {
            settings.destination_root = destination.clone();
        }
        if self.links {
            settings.create_internal_links = true;
        }
        if self.no_urls {
            settings.detect_external_urls = false;
        }
        if self.no_tags {
            settings.tag_notes = false;
        }
        if self.no_metadata {
            settings.add_file_metadata = false;
        }
        if self.extended_metadata {
            settings.detect_additional_metadata = true;
        }
    }
}
