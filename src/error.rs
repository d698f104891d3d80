//! エラーハンドリング
//!
//! カーソル移動 Undo エンジン全体で使用するエラー型を定義する。
//! 設定エラーは登録時に即座に報告し、読み取り専用エラーはユーザーが
//! 状態を変えて再試行できる回復可能なエラーとして扱う。

use thiserror::Error;

use crate::undo_log::BufferId;

/// エンジン全体のエラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CursorUndoError {
    /// 設定エラー
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// 読み取り専用バッファで編集コマンドを取り消そうとした
    #[error("Cannot undo an editing command on a read-only buffer")]
    ReadOnly,

    /// 読み取り専用バッファへの変更
    #[error("Buffer is read-only")]
    BufferReadOnly,

    /// 取り消せる履歴が残っていない
    #[error("No further undo information")]
    NoFurtherUndo,

    /// 存在しないバッファ
    #[error("Unknown buffer: {id}")]
    UnknownBuffer { id: BufferId },
}

/// 設定固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{command}: this configuration would record nothing (screen_pos = false, no_move = true)")]
    RecordsNothing { command: String },

    #[error("Invalid configuration file: {path}: {message}")]
    InvalidFile { path: String, message: String },

    #[error("IO error: {message}")]
    Io { message: String },
}

/// エラーレベル分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLevel {
    Info,
    Warning,
    Error,
    Fatal,
}

impl CursorUndoError {
    /// エラーレベルを取得
    pub fn level(&self) -> ErrorLevel {
        match self {
            CursorUndoError::Config(_) => ErrorLevel::Error,
            CursorUndoError::ReadOnly | CursorUndoError::BufferReadOnly => ErrorLevel::Warning,
            CursorUndoError::NoFurtherUndo => ErrorLevel::Info,
            CursorUndoError::UnknownBuffer { .. } => ErrorLevel::Error,
        }
    }

    /// ユーザーが操作を変えて再試行できるか
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, CursorUndoError::Config(_))
    }

    /// ミニバッファ表示用のメッセージ
    pub fn user_message(&self) -> String {
        match self {
            CursorUndoError::Config(ConfigError::RecordsNothing { command }) => {
                format!("{}: この設定では何も記録されません", command)
            }
            CursorUndoError::Config(ConfigError::InvalidFile { path, .. }) => {
                format!("無効な設定ファイルです: {}", path)
            }
            CursorUndoError::Config(ConfigError::Io { message }) => {
                format!("設定ファイルを読み書きできません: {}", message)
            }
            CursorUndoError::ReadOnly => {
                "読み取り専用バッファでは編集コマンドを取り消せません".to_string()
            }
            CursorUndoError::BufferReadOnly => "バッファは読み取り専用です".to_string(),
            CursorUndoError::NoFurtherUndo => "取り消す操作はありません".to_string(),
            CursorUndoError::UnknownBuffer { id } => {
                format!("バッファが見つかりません: {}", id)
            }
        }
    }
}

/// 結果型のエイリアス
pub type Result<T> = std::result::Result<T, CursorUndoError>;
