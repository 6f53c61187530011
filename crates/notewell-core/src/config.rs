//! Import settings and the validated per-run configuration.
//!
//! `ImportSettings` is the loose, user-editable settings bag (all fields
//! defaulted). `ImportConfig` is what a run actually consumes: it is only
//! produced by [`ImportSettings::validate`], so every run sees extensions,
//! tags and limits that were checked before any file is touched.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Context;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compile_regex;

/// Extensions a run may import.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["txt", "md", "pdf"];

/// Default vault folder that receives run subdirectories.
pub const DEFAULT_DESTINATION_ROOT: &str = "notewell";

static GLOBAL_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(r"^[A-Za-z_][A-Za-z0-9_-]*$"));

/// Configuration errors. Any of these aborts a run before discovery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid file extensions: {}. Only txt, md, pdf are allowed.", .0.join(", "))]
    InvalidExtensions(Vec<String>),
    #[error("No file extensions specified.")]
    NoExtensions,
    #[error("No import directory specified.")]
    MissingSourceRoot,
    #[error("Import directory does not exist: {}", .0.display())]
    SourceRootNotFound(PathBuf),
    #[error("Invalid tags: {}. Tags must not have spaces, special characters, or start with digits.", .0.join(", "))]
    InvalidGlobalTags(Vec<String>),
    #[error("Max file size must be an integer greater than 0")]
    InvalidMaxFileSize,
    #[error("Max tags must be greater than 0")]
    InvalidMaxTags,
    #[error("Destination root must be a relative vault folder: {0}")]
    InvalidDestinationRoot(String),
}

/// A file format the pipeline knows how to convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Text,
    Markdown,
    Pdf,
}

impl FileKind {
    /// Parse an extension token, ignoring case, surrounding space and a
    /// leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "txt" => Some(Self::Text),
            "md" => Some(Self::Markdown),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Kind of a path, judged by its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Markdown => "md",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// How far below the source root discovery descends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecursionDepth {
    Unlimited,
    /// Number of child folder levels; `Levels(0)` means the root only.
    Levels(usize),
}

impl RecursionDepth {
    /// Settings encode unlimited as any negative number.
    pub fn from_setting(depth: i64) -> Self {
        if depth < 0 {
            Self::Unlimited
        } else {
            Self::Levels(usize::try_from(depth).unwrap_or(usize::MAX))
        }
    }

    /// Whether entries found `depth` levels below the root may be visited.
    pub fn allows(&self, depth: usize) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Levels(max) => depth <= *max,
        }
    }
}

/// Default settings file: `<config dir>/notewell/settings.json`.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("notewell").join("settings.json"))
}

/// User-facing settings, as stored in the settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImportSettings {
    pub import_directory: Option<PathBuf>,
    /// Comma-separated extension list, e.g. `"txt, md"`.
    pub file_extensions: String,
    /// `-1` for unlimited.
    pub max_recursion_depth: i64,
    pub replicate_folder_structure: bool,
    pub file_prefix: String,
    pub dry_run: bool,
    pub detect_external_urls: bool,
    pub tag_notes: bool,
    pub max_tags: usize,
    pub create_internal_links: bool,
    pub add_file_metadata: bool,
    pub detect_additional_metadata: bool,
    /// Comma-separated tags applied to every imported note.
    pub global_tags: String,
    #[serde(rename = "maxFileSizeMB")]
    pub max_file_size_mb: u64,
    pub destination_root: String,
    pub debug_enabled: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            import_directory: dirs::home_dir().map(|home| home.join("notewell_import")),
            file_extensions: "txt,md".to_string(),
            max_recursion_depth: 0,
            replicate_folder_structure: true,
            file_prefix: String::new(),
            dry_run: true,
            detect_external_urls: true,
            tag_notes: true,
            max_tags: 5,
            create_internal_links: false,
            add_file_metadata: true,
            detect_additional_metadata: false,
            global_tags: String::new(),
            max_file_size_mb: 2,
            destination_root: DEFAULT_DESTINATION_ROOT.to_string(),
            debug_enabled: false,
        }
    }
}

impl ImportSettings {
    /// Load settings from a JSON file, falling back to defaults when the file
    /// is missing or unreadable.
    pub fn load(path: &Path) -> Self {
        Self::try_load(path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %format!("{:#}", e), "Using default settings");
            Self::default()
        })
    }

    /// Like [`ImportSettings::load`], but reports read and parse errors. A
    /// missing file still yields defaults.
    pub fn try_load(path: &Path) -> anyhow::Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("Failed to read settings file {}", path.display())))
            }
        };
        serde_json::from_str(&contents)
            .with_context(|| format!("Invalid settings file {}", path.display()))
    }

    /// Write settings as pretty JSON, creating parent folders as needed.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Validate the settings into an immutable run configuration.
    ///
    /// Extension tokens are checked first so an invalid list is reported even
    /// when other settings are also wrong.
    pub fn validate(&self) -> Result<ImportConfig, ConfigError> {
        let extensions = parse_extensions(&self.file_extensions)?;

        let source_root = match &self.import_directory {
            Some(dir) if !dir.as_os_str().is_empty() => dir.clone(),
            _ => return Err(ConfigError::MissingSourceRoot),
        };
        if !source_root.is_dir() {
            return Err(ConfigError::SourceRootNotFound(source_root));
        }

        if self.max_file_size_mb == 0 {
            return Err(ConfigError::InvalidMaxFileSize);
        }
        if self.tag_notes && self.max_tags == 0 {
            return Err(ConfigError::InvalidMaxTags);
        }

        let global_tags = parse_global_tags(&self.global_tags)?;

        let destination_root = self.destination_root.trim().trim_matches('/').to_string();
        if destination_root.is_empty()
            || destination_root
                .split('/')
                .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(ConfigError::InvalidDestinationRoot(
                self.destination_root.clone(),
            ));
        }

        Ok(ImportConfig {
            source_root,
            extensions,
            max_depth: RecursionDepth::from_setting(self.max_recursion_depth),
            replicate_folder_structure: self.replicate_folder_structure,
            file_prefix: self.file_prefix.clone(),
            dry_run: self.dry_run,
            features: FeatureToggles {
                detect_urls: self.detect_external_urls,
                tag_notes: self.tag_notes,
                internal_links: self.create_internal_links,
                file_metadata: self.add_file_metadata,
                extended_metadata: self.detect_additional_metadata,
            },
            max_tags: self.max_tags,
            global_tags,
            max_file_size_mb: self.max_file_size_mb,
            destination_root,
        })
    }
}

/// Split and check a comma-separated extension list.
pub fn parse_extensions(raw: &str) -> Result<Vec<FileKind>, ConfigError> {
    let tokens: Vec<String> = raw
        .split(',')
        .map(|ext| ext.trim().to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect();
    if tokens.is_empty() {
        return Err(ConfigError::NoExtensions);
    }

    let invalid: Vec<String> = tokens
        .iter()
        .filter(|ext| FileKind::from_extension(ext).is_none())
        .cloned()
        .collect();
    if !invalid.is_empty() {
        return Err(ConfigError::InvalidExtensions(invalid));
    }

    let mut kinds = Vec::new();
    for token in &tokens {
        if let Some(kind) = FileKind::from_extension(token) {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
    }
    Ok(kinds)
}

/// Split and check the comma-separated global tag list.
pub fn parse_global_tags(raw: &str) -> Result<Vec<String>, ConfigError> {
    let tags: Vec<String> = raw
        .split(',')
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();

    let invalid: Vec<String> = tags
        .iter()
        .filter(|tag| !GLOBAL_TAG_REGEX.is_match(tag))
        .cloned()
        .collect();
    if !invalid.is_empty() {
        return Err(ConfigError::InvalidGlobalTags(invalid));
    }
    Ok(tags)
}

/// Per-feature switches for the file pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureToggles {
    pub detect_urls: bool,
    pub tag_notes: bool,
    pub internal_links: bool,
    pub file_metadata: bool,
    pub extended_metadata: bool,
}

/// Validated configuration for one import run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportConfig {
    pub source_root: PathBuf,
    pub extensions: Vec<FileKind>,
    pub max_depth: RecursionDepth,
    pub replicate_folder_structure: bool,
    pub file_prefix: String,
    pub dry_run: bool,
    pub features: FeatureToggles,
    pub max_tags: usize,
    pub global_tags: Vec<String>,
    pub max_file_size_mb: u64,
    /// Vault folder receiving the run subdirectory, `/`-separated.
    pub destination_root: String,
}

impl ImportConfig {
    /// Size ceiling in bytes.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}
