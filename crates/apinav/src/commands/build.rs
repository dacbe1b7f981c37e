//! `apinav build` command implementation.

use std::path::{Path, PathBuf};

use apinav_config::{CliSettings, Config};
use apinav_site::{ApiDataFactory, EntityRecord};
use apinav_storage_fs::FsPageWriter;
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover apinav.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Extractor JSON output to read (overrides config).
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory for pages and data files (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Write compact JSON instead of pretty-printed.
    #[arg(long)]
    pub(crate) compact: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        let input = &config.input_resolved.path;
        let out = &config.output_resolved;

        output.info(&format!("Input: {}", input.display()));
        output.info(&format!("Output: {}", out.dir.display()));

        let records = read_records(input)?;
        tracing::info!(records = records.len(), "Loaded documentation data");

        let writer = FsPageWriter::create(&out.dir, out.pretty)?
            .reserving([out.navigation_file.as_str(), out.search_file.as_str()]);
        let data = ApiDataFactory::new().create_data(&records, &writer)?;

        writer.write_artifact(&out.navigation_file, &data.navigation)?;
        writer.write_artifact(&out.search_file, &data.search_keywords)?;

        output.success(&format!(
            "Built {} navigation entries and {} search keywords in {}",
            data.navigation.len(),
            data.search_keywords.len(),
            out.dir.display()
        ));
        Ok(())
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            input: self.input.clone(),
            output_dir: self.output_dir.clone(),
            pretty: self.compact.then_some(false),
        }
    }
}

/// Read and parse the extractor's record array.
fn read_records(path: &Path) -> Result<Vec<EntityRecord>, CliError> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CliError::ParseInput {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use apinav_site::PageWriteErrorKind;
    use pretty_assertions::assert_eq;

    use super::*;

    fn args(dir: &Path) -> BuildArgs {
        BuildArgs {
            config: None,
            input: Some(dir.join("docs.json")),
            output_dir: Some(dir.join("api")),
            compact: false,
            verbose: false,
        }
    }

    #[test]
    fn test_cli_settings_default_keeps_config() {
        let args = BuildArgs {
            config: None,
            input: None,
            output_dir: None,
            compact: false,
            verbose: false,
        };

        let settings = args.cli_settings();

        assert!(settings.input.is_none());
        assert!(settings.output_dir.is_none());
        assert!(settings.pretty.is_none());
    }

    #[test]
    fn test_cli_settings_compact_disables_pretty() {
        let args = BuildArgs {
            compact: true,
            ..args(Path::new("/project"))
        };

        let settings = args.cli_settings();

        assert_eq!(settings.input, Some(PathBuf::from("/project/docs.json")));
        assert_eq!(settings.output_dir, Some(PathBuf::from("/project/api")));
        assert_eq!(settings.pretty, Some(false));
    }

    #[test]
    fn test_read_records_missing_file() {
        let temp = tempfile::tempdir().unwrap();

        let err = read_records(&temp.path().join("docs.json")).unwrap_err();

        assert!(matches!(err, CliError::ReadInput { .. }));
        assert!(err.to_string().contains("docs.json"));
    }

    #[test]
    fn test_read_records_invalid_json() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("docs.json");
        fs::write(&path, r#"{"name": "not an array"}"#).unwrap();

        let err = read_records(&path).unwrap_err();

        assert!(matches!(err, CliError::ParseInput { .. }));
    }

    #[test]
    fn test_execute_writes_all_outputs() {
        let temp = tempfile::tempdir().unwrap();
        let config_path = temp.path().join("apinav.toml");
        fs::write(&config_path, "[output]\nsearch_file = \"keywords.json\"\n").unwrap();
        fs::write(
            temp.path().join("docs.json"),
            r#"[
                {"name": "module:ui/button", "kind": "module"},
                {"name": "press", "kind": "function", "memberof": "module:ui/button"},
                {"name": "Theme", "kind": "typedef"}
            ]"#,
        )
        .unwrap();

        BuildArgs {
            config: Some(config_path),
            ..args(temp.path())
        }
        .execute()
        .unwrap();

        let api = temp.path().join("api");
        for file in [
            "ui_button.json",
            "global.json",
            "navigation.json",
            "keywords.json",
        ] {
            assert!(api.join(file).is_file(), "missing {file}");
        }

        let navigation: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(api.join("navigation.json")).unwrap())
                .unwrap();
        let ids: Vec<_> = navigation
            .as_array()
            .unwrap()
            .iter()
            .map(|node| node["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["ui_button", "global"]);
        assert!(!api.join("Theme.json").exists());
    }

    #[test]
    fn test_execute_refuses_page_named_like_data_file() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(
            temp.path().join("docs.json"),
            r#"[{"name": "navigation", "kind": "namespace"}]"#,
        )
        .unwrap();

        let err = args(temp.path()).execute().unwrap_err();

        let err = match err {
            CliError::Write(err) => err,
            other => panic!("expected a write error, got {other:?}"),
        };
        assert_eq!(err.kind, PageWriteErrorKind::InvalidId);
        assert_eq!(err.page_id.as_deref(), Some("navigation"));
        assert!(!temp.path().join("api/navigation.json").exists());
    }
}
