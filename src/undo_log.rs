//! Undo ログ
//!
//! ホストがバッファごとに所有する Undo ログと、そのエントリ型を定義する。
//! ログは先頭が最新のエントリで、Undo 再生は先頭から順に消費する。

use std::collections::VecDeque;
use std::fmt;

/// ホストのアドレス空間上の位置
///
/// エンジンは等値比較にのみ使用し、値を解釈しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BufferOffset(usize);

impl BufferOffset {
    pub const fn new(offset: usize) -> Self {
        Self(offset)
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

impl From<usize> for BufferOffset {
    fn from(offset: usize) -> Self {
        Self(offset)
    }
}

impl fmt::Display for BufferOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// バッファ識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferId(pub usize);

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// エンジンが挿入するアクションの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// 表示開始位置を復元する
    RestoreViewport,
}

/// エンジン以外が記録した編集操作
///
/// エンジンは中身を検査しない。ホストが Undo 再生時に解釈する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditRecord {
    /// `[start, end)` に挿入されたテキスト
    Insert { start: usize, end: usize },
    /// `position` から削除されたテキスト
    Delete { position: usize, text: String },
    /// その他のホスト固有エントリ
    Opaque(String),
}

/// Undo ログのエントリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoLogEntry {
    /// Undo ステップの区切り
    Boundary,
    /// カーソルを `pos` に戻す
    PositionMarker(BufferOffset),
    /// アクション呼び出し
    ActionCall { kind: ActionKind, arg: BufferOffset },
    /// エンジン以外のエントリ
    Other(EditRecord),
}

impl UndoLogEntry {
    pub fn is_boundary(&self) -> bool {
        matches!(self, UndoLogEntry::Boundary)
    }

    pub fn is_position_marker(&self) -> bool {
        matches!(self, UndoLogEntry::PositionMarker(_))
    }

    pub fn is_restore_viewport(&self) -> bool {
        matches!(
            self,
            UndoLogEntry::ActionCall {
                kind: ActionKind::RestoreViewport,
                ..
            }
        )
    }
}

/// バッファの Undo ログ
///
/// `Disabled` は Undo 記録が無効化されたバッファを表し、空のログとは区別する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoLog {
    Disabled,
    Active(VecDeque<UndoLogEntry>),
}

impl Default for UndoLog {
    fn default() -> Self {
        UndoLog::new()
    }
}

impl UndoLog {
    /// 空の有効なログを作成
    pub fn new() -> Self {
        UndoLog::Active(VecDeque::new())
    }

    /// 先頭が最新となるエントリ列からログを作成
    pub fn from_entries<I: IntoIterator<Item = UndoLogEntry>>(entries: I) -> Self {
        UndoLog::Active(entries.into_iter().collect())
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, UndoLog::Disabled)
    }

    /// 先頭にエントリを追加する
    ///
    /// 無効化されたログは、追加したエントリだけを持つ新しいログに置き換わる。
    pub fn push(&mut self, entry: UndoLogEntry) {
        match self {
            UndoLog::Active(entries) => entries.push_front(entry),
            UndoLog::Disabled => *self = UndoLog::Active(VecDeque::from(vec![entry])),
        }
    }

    /// 先頭に区切りを挿入する（ログが空か先頭が既に区切りなら何もしない）
    pub fn undo_boundary(&mut self) {
        if let UndoLog::Active(entries) = self {
            if entries.front().is_some_and(|entry| !entry.is_boundary()) {
                entries.push_front(UndoLogEntry::Boundary);
            }
        }
    }

    /// 先頭のエントリ
    pub fn front(&self) -> Option<&UndoLogEntry> {
        match self {
            UndoLog::Active(entries) => entries.front(),
            UndoLog::Disabled => None,
        }
    }

    /// 先頭2つのエントリ
    pub fn front_pair(&self) -> (Option<&UndoLogEntry>, Option<&UndoLogEntry>) {
        match self {
            UndoLog::Active(entries) => (entries.front(), entries.get(1)),
            UndoLog::Disabled => (None, None),
        }
    }

    /// 先頭の区切りを1つだけ読み飛ばした位置のエントリ
    pub fn front_past_boundary(&self) -> Option<&UndoLogEntry> {
        match self.front_pair() {
            (Some(UndoLogEntry::Boundary), next) => next,
            (first, _) => first,
        }
    }

    /// 先頭からエントリを取り除く
    pub fn pop_front(&mut self) -> Option<UndoLogEntry> {
        match self {
            UndoLog::Active(entries) => entries.pop_front(),
            UndoLog::Disabled => None,
        }
    }

    /// 先頭から順に走査する
    pub fn iter(&self) -> impl Iterator<Item = &UndoLogEntry> {
        let entries = match self {
            UndoLog::Active(entries) => Some(entries),
            UndoLog::Disabled => None,
        };
        entries.into_iter().flatten()
    }

    pub fn len(&self) -> usize {
        match self {
            UndoLog::Active(entries) => entries.len(),
            UndoLog::Disabled => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
