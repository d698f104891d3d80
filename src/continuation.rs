//! 別実装の Undo コマンドとの橋渡し
//!
//! 独自の Undo を持つ編集モードのために、ログ先頭がカーソル移動だけの
//! ステップなら読み取り専用ガード付きの Undo に委譲する。委譲するときは
//! 現在のコマンドを `undo` として記録し、続けて呼ばれたときに Undo の
//! 連続実行として扱わせる。

use crate::error::Result;
use crate::guard::ReadOnlyUndoGuard;
use crate::host::{CommandId, Host};
use crate::undo_log::UndoLog;

/// 別実装 Undo の実行結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlternateUndo<T> {
    /// カーソル移動のステップをホストの Undo で取り消した
    Native,
    /// 別実装の Undo をそのまま実行した
    Secondary(T),
}

/// ログ先頭がカーソル移動だけのステップか判定する
pub fn is_cursor_only_step(log: &UndoLog) -> bool {
    use crate::undo_log::UndoLogEntry::{Boundary, PositionMarker};

    match log.front_pair() {
        (Some(Boundary), Some(PositionMarker(_))) | (Some(PositionMarker(_)), Some(Boundary)) => {
            true
        }
        (Some(Boundary), Some(second)) => second.is_restore_viewport(),
        (Some(first), Some(Boundary)) => first.is_restore_viewport(),
        _ => false,
    }
}

/// 別実装 Undo の継続検出器
#[derive(Debug, Clone, Copy, Default)]
pub struct ContinuationDetector {
    guard: ReadOnlyUndoGuard,
}

impl ContinuationDetector {
    pub fn new(guard: ReadOnlyUndoGuard) -> Self {
        Self { guard }
    }

    /// 別実装の Undo コマンドを実行する
    pub fn run<H, T, F>(&self, host: &mut H, secondary: F) -> Result<AlternateUndo<T>>
    where
        H: Host + ?Sized,
        F: FnOnce(&mut H) -> Result<T>,
    {
        if !is_cursor_only_step(host.undo_log()) {
            return secondary(host).map(AlternateUndo::Secondary);
        }
        log::trace!("delegating cursor-only step to guarded undo");
        host.override_this_command(CommandId::undo());
        self.guard.undo(host)?;
        Ok(AlternateUndo::Native)
    }
}
