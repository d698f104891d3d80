//! エンジン設定
//!
//! JSON 形式の設定ファイルを読み書きする。フラグの検証は読み込み時ではなく
//! 登録時（[`MovementRegistry`](crate::registry::MovementRegistry)）に行う。

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codec::CodecOptions;
use crate::error::ConfigError;
use crate::registry::MovementFlags;

/// 設定ファイル名
pub const CONFIG_FILE_NAME: &str = "cursor-undo.json";

/// エンジン設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 起動時に追跡を有効にする
    pub enabled: bool,
    /// 表示位置復元の再生後に不要エントリを掃除する
    pub clean_undo_list: bool,
    /// 組み込みの移動コマンド表を使用する
    pub use_default_commands: bool,
    /// 追加・上書きする移動コマンド
    pub commands: Vec<CommandSpec>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            clean_undo_list: true,
            use_default_commands: true,
            commands: Vec::new(),
        }
    }
}

/// 設定ファイル上のコマンド登録
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub command: String,
    #[serde(default)]
    pub no_combine: bool,
    #[serde(default)]
    pub screen_pos: bool,
    #[serde(default)]
    pub no_move: bool,
}

impl CommandSpec {
    pub fn new(command: impl Into<String>, flags: MovementFlags) -> Self {
        Self {
            command: command.into(),
            no_combine: flags.no_combine,
            screen_pos: flags.screen_pos,
            no_move: flags.no_move,
        }
    }

    pub fn flags(&self) -> MovementFlags {
        MovementFlags::new(self.no_combine, self.screen_pos, self.no_move)
    }
}

impl EngineConfig {
    /// 既定の設定ファイルパス（`<config dir>/altre/cursor-undo.json`）
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("altre").join(CONFIG_FILE_NAME))
    }

    pub fn codec_options(&self) -> CodecOptions {
        CodecOptions {
            clean_undo_list: self.clean_undo_list,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|err| ConfigError::InvalidFile {
            path: "<inline>".to_string(),
            message: err.to_string(),
        })
    }

    /// 設定ファイルを読み込む
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|err| ConfigError::Io {
            message: format!("{}: {}", path.display(), err),
        })?;
        serde_json::from_str(&content).map_err(|err| ConfigError::InvalidFile {
            path: path.display().to_string(),
            message: err.to_string(),
        })
    }

    /// 設定ファイルが存在すれば読み込み、なければ既定値を返す
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// 設定ファイルを書き出す
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let io_error = |err: std::io::Error| ConfigError::Io {
            message: format!("{}: {}", path.display(), err),
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|err| ConfigError::InvalidFile {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        fs::write(path, json).map_err(io_error)
    }
}
