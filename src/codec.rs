//! Undo ログエントリの再生
//!
//! エンジンが挿入する唯一のアクション（表示開始位置の復元）の再生処理と、
//! ホストの Undo 再生が残す不要エントリの掃除を行う。

use crate::host::{BufferModel, UndoStore};
use crate::undo_log::{ActionKind, BufferOffset, UndoLog, UndoLogEntry};

/// 再生時のオプション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    /// 再生後に不要エントリを掃除する
    pub clean_undo_list: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            clean_undo_list: true,
        }
    }
}

impl ActionKind {
    /// アクションを再生する
    pub fn replay<H>(self, host: &mut H, arg: BufferOffset, options: CodecOptions)
    where
        H: BufferModel + UndoStore + ?Sized,
    {
        match self {
            ActionKind::RestoreViewport => {
                host.set_viewport_start(arg);
                if options.clean_undo_list {
                    let removed = strip_replay_leftovers(host.undo_log_mut());
                    if removed > 0 {
                        log::trace!("collapsed {} consumed viewport entries", removed);
                    }
                }
            }
        }
    }
}

/// 先頭の `Boundary, ActionCall(RestoreViewport), Boundary` を繰り返し1つの区切りに縮める
///
/// 縮めた組の数を返す。
pub fn strip_replay_leftovers(log: &mut UndoLog) -> usize {
    let mut removed = 0;
    while is_replay_leftover(log) {
        log.pop_front();
        log.pop_front();
        removed += 1;
    }
    removed
}

fn is_replay_leftover(log: &UndoLog) -> bool {
    let mut entries = log.iter();
    matches!(
        (entries.next(), entries.next(), entries.next()),
        (Some(UndoLogEntry::Boundary), Some(action), Some(UndoLogEntry::Boundary))
            if action.is_restore_viewport()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;

    fn viewport(offset: usize) -> UndoLogEntry {
        UndoLogEntry::ActionCall {
            kind: ActionKind::RestoreViewport,
            arg: BufferOffset::new(offset),
        }
    }

    #[test]
    fn strips_repeated_leftovers() {
        let mut log = UndoLog::from_entries(vec![
            UndoLogEntry::Boundary,
            viewport(10),
            UndoLogEntry::Boundary,
            viewport(20),
            UndoLogEntry::Boundary,
            UndoLogEntry::PositionMarker(BufferOffset::new(3)),
        ]);
        assert_eq!(strip_replay_leftovers(&mut log), 2);
        assert_eq!(
            log,
            UndoLog::from_entries(vec![
                UndoLogEntry::Boundary,
                UndoLogEntry::PositionMarker(BufferOffset::new(3)),
            ])
        );
    }

    #[test]
    fn leaves_other_shapes_alone() {
        let entries = vec![
            UndoLogEntry::Boundary,
            UndoLogEntry::PositionMarker(BufferOffset::new(4)),
            UndoLogEntry::Boundary,
        ];
        let mut log = UndoLog::from_entries(entries.clone());
        assert_eq!(strip_replay_leftovers(&mut log), 0);
        assert_eq!(log, UndoLog::from_entries(entries));
    }

    #[test]
    fn replay_sets_viewport_start() {
        let mut host = MemoryHost::with_text("line\n".repeat(50));
        host.undo_log_mut().push(UndoLogEntry::Boundary);
        host.undo_log_mut().push(viewport(30));
        host.undo_log_mut().push(UndoLogEntry::Boundary);

        ActionKind::RestoreViewport.replay(
            &mut host,
            BufferOffset::new(15),
            CodecOptions {
                clean_undo_list: false,
            },
        );
        assert_eq!(host.viewport_start(), Some(BufferOffset::new(15)));
        assert_eq!(host.undo_log().len(), 3);

        ActionKind::RestoreViewport.replay(&mut host, BufferOffset::new(5), CodecOptions::default());
        assert_eq!(host.viewport_start(), Some(BufferOffset::new(5)));
        assert_eq!(host.undo_log().len(), 1);
    }
}
