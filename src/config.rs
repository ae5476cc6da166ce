//! Project configuration. A project is a directory containing a
//! `molitvenik.yaml` file; [`Config::from_directory`] walks parent
//! directories until it finds one, so the CLI works from anywhere inside the
//! project tree.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

const PROJECT_FILE: &str = "molitvenik.yaml";

#[derive(Deserialize)]
struct DataDirectory(PathBuf);
impl Default for DataDirectory {
    fn default() -> Self {
        DataDirectory(PathBuf::from("data"))
    }
}

#[derive(Deserialize)]
struct EntryPathPrefix(String);
impl Default for EntryPathPrefix {
    fn default() -> Self {
        EntryPathPrefix("molitvy".to_owned())
    }
}

#[derive(Deserialize)]
struct CategoriesFile(PathBuf);
impl Default for CategoriesFile {
    fn default() -> Self {
        CategoriesFile(PathBuf::from("prayer-categories.json"))
    }
}

/// The raw project file contents.
#[derive(Deserialize)]
struct Project {
    site_root: Url,

    #[serde(default)]
    data_directory: DataDirectory,

    #[serde(default)]
    entry_path_prefix: EntryPathPrefix,

    #[serde(default)]
    categories_file: CategoriesFile,

    #[serde(default)]
    favorites_file: Option<PathBuf>,
}

/// Fully resolved configuration: all paths resolved against the project
/// root.
pub struct Config {
    /// The site's root URL, used to build canonical permalinks.
    pub site_root: Url,

    /// The path segment under which entry pages live (e.g. `molitvy`).
    pub entry_path_prefix: String,

    /// The content store's data directory.
    pub data_directory: PathBuf,

    /// The category table file.
    pub categories_path: PathBuf,

    /// The favorites slot for the CLI. Defaults to a per-user data directory
    /// so favorites survive across runs on the same machine.
    pub favorites_path: PathBuf,
}

impl Config {
    /// Finds the project file in `dir` or the nearest ancestor directory and
    /// loads it.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path)
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent),
                None => Err(Error::ProjectFileNotFound),
            }
        }
    }

    /// Loads configuration from an explicit project file path.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = std::fs::File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let project: Project = serde_yaml::from_reader(file)?;
        let project_root = path.parent().unwrap_or_else(|| Path::new("."));

        let data_directory = project_root.join(project.data_directory.0);
        Ok(Config {
            site_root: project.site_root,
            entry_path_prefix: project.entry_path_prefix.0,
            categories_path: data_directory.join(project.categories_file.0),
            favorites_path: match project.favorites_file {
                Some(path) => project_root.join(path),
                None => default_favorites_path(),
            },
            data_directory,
        })
    }
}

fn default_favorites_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("molitvenik")
        .join("favorites.json")
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a configuration loading failure.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when no `molitvenik.yaml` exists in the starting directory
    /// or any of its ancestors.
    #[error("could not find `molitvenik.yaml` in any parent directory")]
    ProjectFileNotFound,

    /// Returned when the project file cannot be opened.
    #[error("opening project file `{path}`: {err}")]
    Open {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned when the project file fails to parse.
    #[error("parsing project file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join(PROJECT_FILE),
            "site_root: https://molitvy.example.org/\n",
        )?;

        let config = Config::from_directory(dir.path())?;
        assert_eq!("https://molitvy.example.org/", config.site_root.as_str());
        assert_eq!("molitvy", config.entry_path_prefix);
        assert_eq!(dir.path().join("data"), config.data_directory);
        assert_eq!(
            dir.path().join("data").join("prayer-categories.json"),
            config.categories_path,
        );
        Ok(())
    }

    #[test]
    fn test_discovery_walks_parents() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join(PROJECT_FILE),
            "site_root: https://molitvy.example.org/\n",
        )?;
        let nested = dir.path().join("data").join("prayers");
        std::fs::create_dir_all(&nested)?;

        let config = Config::from_directory(&nested)?;
        assert_eq!(dir.path().join("data"), config.data_directory);
        Ok(())
    }

    #[test]
    fn test_explicit_overrides() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join(PROJECT_FILE),
            "site_root: https://molitvy.example.org/\n\
             data_directory: content\n\
             entry_path_prefix: prayers\n\
             favorites_file: favorites.json\n",
        )?;

        let config = Config::from_directory(dir.path())?;
        assert_eq!("prayers", config.entry_path_prefix);
        assert_eq!(dir.path().join("content"), config.data_directory);
        assert_eq!(dir.path().join("favorites.json"), config.favorites_path);
        Ok(())
    }

    #[test]
    fn test_missing_project_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        // No project file anywhere under the temp root; discovery climbs to
        // the filesystem root and gives up.
        let result = Config::from_directory(dir.path());
        assert!(matches!(result, Err(Error::ProjectFileNotFound)));
        Ok(())
    }
}
