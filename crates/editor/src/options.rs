use std::path::Path;

use serde::Deserialize;
use strum_macros::{Display, EnumString};

/// What typing does to the nibble under the caret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EditMode {
    #[default]
    Insert,
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ClipboardKind {
    /// Use xclip, xsel or wl-clipboard if one is found
    #[default]
    System,
    /// Keep copied data inside the editor
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Mode new sessions start in
    pub mode: EditMode,
    pub clipboard: ClipboardKind,
    /// Write hex digits in uppercase
    pub uppercase: bool,
    pub bytes_per_row: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            mode: EditMode::Insert,
            clipboard: ClipboardKind::System,
            uppercase: true,
            bytes_per_row: 16,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub editor: Options,
}

pub const PROJECT_CONFIG: &str = "hexed.toml";

/// Read options from the given configuration file and the project
/// configuration in the working directory. Project configuration overrides
/// the given file, missing project configuration is ignored.
pub fn read_config(config_path: Option<&Path>, working_dir: &Path) -> anyhow::Result<Config> {
    let mut local = working_dir.to_path_buf();
    local.push(PROJECT_CONFIG);

    let mut builder = config::Config::builder();
    if let Some(path) = config_path {
        builder = builder.add_source(config::File::from(path));
    }
    let config = builder
        .add_source(config::File::from(local).required(false))
        .build()?;

    let config = config.try_deserialize::<Config>()?;

    Ok(config)
}
