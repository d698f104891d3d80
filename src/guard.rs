//! 読み取り専用バッファ向けの Undo ガード
//!
//! ホストの汎用 Undo の前に置き、次に取り消すステップがカーソル移動だけなら
//! 読み取り専用バッファでも Undo を許可する。編集を含むステップでは
//! 読み取り専用バッファの Undo を拒否し、最後の編集位置で止まる。

use crate::error::{CursorUndoError, Result};
use crate::host::{CommandContext, Host, UndoStore};
use crate::undo_log::UndoLogEntry;

/// 次に取り消すステップの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingStep {
    /// カーソル移動だけのステップ
    CursorOnly,
    /// 編集などそれ以外のステップ
    Other,
}

/// 読み取り専用 Undo ガード
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOnlyUndoGuard;

impl ReadOnlyUndoGuard {
    pub fn new() -> Self {
        Self
    }

    /// 次に取り消すステップを分類する
    pub fn classify<H>(&self, host: &H) -> PendingStep
    where
        H: UndoStore + CommandContext + ?Sized,
    {
        let continuing = host.last_command().is_some_and(|command| command.is_undo());
        let cursor_only = if continuing {
            host.pending_undo()
                .and_then(<[UndoLogEntry]>::first)
                .is_some_and(UndoLogEntry::is_position_marker)
        } else {
            matches!(
                host.undo_log().front_pair(),
                (Some(UndoLogEntry::Boundary), Some(UndoLogEntry::PositionMarker(_)))
            )
        };
        if cursor_only {
            PendingStep::CursorOnly
        } else {
            PendingStep::Other
        }
    }

    /// ガード付きで Undo を実行する
    pub fn undo<H: Host + ?Sized>(&self, host: &mut H) -> Result<()> {
        match self.classify(host) {
            PendingStep::CursorOnly => {
                if host.is_read_only() {
                    log::debug!("undoing cursor-only step in read-only buffer {}", host.current_buffer());
                }
                host.native_undo(true)
            }
            PendingStep::Other if host.is_read_only() => {
                log::warn!("refusing to undo an edit in read-only buffer {}", host.current_buffer());
                Err(CursorUndoError::ReadOnly)
            }
            PendingStep::Other => host.native_undo(false),
        }
    }
}
