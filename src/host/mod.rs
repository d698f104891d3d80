//! ホストインターフェース
//!
//! エンジンが利用するエディタ側の機能（バッファ、Undo ログ、コマンドループ）を
//! トレイトとして定義する。

pub mod memory;

use std::borrow::Borrow;
use std::fmt;

use crate::error::Result;
use crate::undo_log::{BufferId, BufferOffset, UndoLog, UndoLogEntry};

pub use memory::{MemoryBuffer, MemoryHost};

/// コマンド識別子（コマンド名）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(String);

impl CommandId {
    /// ホストの汎用 Undo コマンド名
    pub const UNDO: &'static str = "undo";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn undo() -> Self {
        Self::new(Self::UNDO)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_undo(&self) -> bool {
        self.0 == Self::UNDO
    }
}

impl From<&str> for CommandId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for CommandId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Borrow<str> for CommandId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// カレントバッファの状態
pub trait BufferModel {
    fn current_buffer(&self) -> BufferId;
    fn point(&self) -> BufferOffset;
    fn set_point(&mut self, pos: BufferOffset);
    /// 表示開始位置（バッファが表示されていなければ `None`）
    fn viewport_start(&self) -> Option<BufferOffset>;
    fn set_viewport_start(&mut self, pos: BufferOffset);
    fn is_read_only(&self) -> bool;
}

/// カレントバッファの Undo ログ
pub trait UndoStore {
    fn undo_log(&self) -> &UndoLog;
    fn undo_log_mut(&mut self) -> &mut UndoLog;

    /// Undo 連続実行中に次に取り消されるエントリ列（実行中でなければ `None`）
    fn pending_undo(&self) -> Option<&[UndoLogEntry]>;

    /// ホスト本来の Undo を1ステップ実行する
    ///
    /// `inhibit_read_only` が真なら読み取り専用バッファでも実行する。
    fn native_undo(&mut self, inhibit_read_only: bool) -> Result<()>;
}

/// コマンドループの文脈
pub trait CommandContext {
    fn last_command(&self) -> Option<&CommandId>;
    fn this_command(&self) -> Option<&CommandId>;
    /// ユーザーが直接呼び出したコマンドか
    fn is_direct_invocation(&self) -> bool;
    /// 記録される現在のコマンド識別子を上書きする
    fn override_this_command(&mut self, command: CommandId);
}

/// エンジンが必要とするホスト機能一式
pub trait Host: BufferModel + UndoStore + CommandContext {}

impl<T: BufferModel + UndoStore + CommandContext> Host for T {}
