//! メモリ上のホスト実装
//!
//! 実エディタなしでエンジンを動かすための参照実装。複数バッファ、
//! コマンドループ（直前・現在のコマンド）と Emacs 流の Undo 再生を持つ。

use crate::codec::CodecOptions;
use crate::error::{CursorUndoError, Result};
use crate::host::{BufferModel, CommandContext, CommandId, UndoStore};
use crate::undo_log::{BufferId, BufferOffset, EditRecord, UndoLog, UndoLogEntry};

/// メモリ上のバッファ
#[derive(Debug, Clone)]
pub struct MemoryBuffer {
    name: String,
    text: String,
    point: usize,
    viewport_start: Option<usize>,
    read_only: bool,
    undo_log: UndoLog,
    pending: Option<Vec<UndoLogEntry>>,
}

impl MemoryBuffer {
    fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            point: 0,
            viewport_start: Some(0),
            read_only: false,
            undo_log: UndoLog::new(),
            pending: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_pos)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len())
    }

    /// 次に取り消すグループ（区切りまで）を取り出す
    fn take_pending_group(&mut self) -> Vec<UndoLogEntry> {
        let Some(pending) = self.pending.as_mut() else {
            return Vec::new();
        };
        loop {
            if pending.is_empty() {
                return Vec::new();
            }
            let group: Vec<_> = match pending.iter().position(UndoLogEntry::is_boundary) {
                Some(end) => {
                    let group: Vec<_> = pending.drain(..end).collect();
                    pending.remove(0);
                    group
                }
                None => pending.drain(..).collect(),
            };
            if !group.is_empty() {
                return group;
            }
        }
    }
}

/// メモリ上のホスト
#[derive(Debug, Clone)]
pub struct MemoryHost {
    buffers: Vec<MemoryBuffer>,
    current: BufferId,
    last_command: Option<CommandId>,
    this_command: Option<CommandId>,
    direct: bool,
    codec: CodecOptions,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    /// 空の `*scratch*` バッファを1つ持つホストを作成
    pub fn new() -> Self {
        Self::with_text("")
    }

    /// 指定テキストの `*scratch*` バッファを持つホストを作成
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            buffers: vec![MemoryBuffer::new("*scratch*", text)],
            current: BufferId(0),
            last_command: None,
            this_command: None,
            direct: false,
            codec: CodecOptions::default(),
        }
    }

    pub fn with_codec_options(mut self, codec: CodecOptions) -> Self {
        self.codec = codec;
        self
    }

    pub fn create_buffer(&mut self, name: &str, text: &str) -> BufferId {
        self.buffers.push(MemoryBuffer::new(name, text));
        BufferId(self.buffers.len() - 1)
    }

    pub fn switch_to_buffer(&mut self, id: BufferId) -> Result<()> {
        if id.0 >= self.buffers.len() {
            return Err(CursorUndoError::UnknownBuffer { id });
        }
        self.current = id;
        Ok(())
    }

    pub fn buffer(&self, id: BufferId) -> Option<&MemoryBuffer> {
        self.buffers.get(id.0)
    }

    pub fn current(&self) -> &MemoryBuffer {
        &self.buffers[self.current.0]
    }

    fn current_mut(&mut self) -> &mut MemoryBuffer {
        &mut self.buffers[self.current.0]
    }

    pub fn text(&self) -> &str {
        self.current().text()
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.current_mut().read_only = read_only;
    }

    /// ウィンドウから外す（表示開始位置がなくなる）
    pub fn detach_window(&mut self) {
        self.current_mut().viewport_start = None;
    }

    /// カーソルを移動する（バッファ範囲に丸める）
    pub fn goto_char(&mut self, pos: usize) {
        let buffer = self.current_mut();
        buffer.point = pos.min(buffer.len_chars());
    }

    pub fn forward_char(&mut self, n: isize) {
        let point = self.current().point as isize;
        self.goto_char((point + n).max(0) as usize);
    }

    /// カーソル位置に挿入する
    pub fn insert(&mut self, text: &str) -> Result<()> {
        let buffer = self.current_mut();
        if buffer.read_only {
            return Err(CursorUndoError::BufferReadOnly);
        }
        if text.is_empty() {
            return Ok(());
        }
        let start = buffer.point;
        let end = start + text.chars().count();
        let idx = buffer.byte_index(start);
        buffer.text.insert_str(idx, text);
        buffer.point = end;
        buffer
            .undo_log
            .push(UndoLogEntry::Other(EditRecord::Insert { start, end }));
        Ok(())
    }

    /// `[start, end)` を削除する
    pub fn delete_range(&mut self, start: usize, end: usize) -> Result<()> {
        let buffer = self.current_mut();
        if buffer.read_only {
            return Err(CursorUndoError::BufferReadOnly);
        }
        let text = buffer.remove_chars(start, end);
        if text.is_empty() {
            return Ok(());
        }
        buffer.point = start.min(buffer.len_chars());
        buffer.undo_log.push(UndoLogEntry::Other(EditRecord::Delete {
            position: start,
            text,
        }));
        Ok(())
    }

    /// ユーザーコマンドとして実行する
    ///
    /// 実行後に区切りを挿入し、現在のコマンドを直前のコマンドへ移す。
    pub fn command<T>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> T) -> T {
        self.this_command = Some(CommandId::new(name));
        let direct = std::mem::replace(&mut self.direct, true);
        let result = f(self);
        self.direct = direct;
        self.current_mut().undo_log.undo_boundary();
        self.last_command = self.this_command.take();
        result
    }

    /// 他のコードからの呼び出しとして実行する
    pub fn call_indirectly<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let direct = std::mem::replace(&mut self.direct, false);
        let result = f(self);
        self.direct = direct;
        result
    }

    fn replay_entry(&mut self, entry: UndoLogEntry) {
        match entry {
            UndoLogEntry::Boundary => {}
            UndoLogEntry::PositionMarker(pos) => self.set_point(pos),
            UndoLogEntry::ActionCall { kind, arg } => {
                let codec = self.codec;
                kind.replay(self, arg, codec);
                self.current_mut()
                    .undo_log
                    .push(UndoLogEntry::ActionCall { kind, arg });
            }
            UndoLogEntry::Other(record) => self.revert_edit(record),
        }
    }

    fn revert_edit(&mut self, record: EditRecord) {
        let buffer = self.current_mut();
        let inverse = match record {
            EditRecord::Insert { start, end } => {
                let text = buffer.remove_chars(start, end);
                buffer.point = start.min(buffer.len_chars());
                EditRecord::Delete {
                    position: start,
                    text,
                }
            }
            EditRecord::Delete { position, text } => {
                let idx = buffer.byte_index(position);
                buffer.text.insert_str(idx, &text);
                let end = position + text.chars().count();
                buffer.point = position;
                EditRecord::Insert {
                    start: position,
                    end,
                }
            }
            opaque @ EditRecord::Opaque(_) => opaque,
        };
        buffer.undo_log.push(UndoLogEntry::Other(inverse));
    }
}

impl MemoryBuffer {
    fn remove_chars(&mut self, start: usize, end: usize) -> String {
        let len = self.len_chars();
        let (start, end) = (start.min(len), end.min(len));
        if start >= end {
            return String::new();
        }
        let from = self.byte_index(start);
        let to = self.byte_index(end);
        self.text.drain(from..to).collect()
    }
}

impl BufferModel for MemoryHost {
    fn current_buffer(&self) -> BufferId {
        self.current
    }

    fn point(&self) -> BufferOffset {
        BufferOffset::new(self.current().point)
    }

    fn set_point(&mut self, pos: BufferOffset) {
        self.goto_char(pos.get());
    }

    fn viewport_start(&self) -> Option<BufferOffset> {
        self.current().viewport_start.map(BufferOffset::new)
    }

    fn set_viewport_start(&mut self, pos: BufferOffset) {
        let buffer = self.current_mut();
        buffer.viewport_start = Some(pos.get().min(buffer.len_chars()));
    }

    fn is_read_only(&self) -> bool {
        self.current().read_only
    }
}

impl UndoStore for MemoryHost {
    fn undo_log(&self) -> &UndoLog {
        &self.current().undo_log
    }

    fn undo_log_mut(&mut self) -> &mut UndoLog {
        &mut self.current_mut().undo_log
    }

    fn pending_undo(&self) -> Option<&[UndoLogEntry]> {
        self.current().pending.as_deref()
    }

    fn native_undo(&mut self, inhibit_read_only: bool) -> Result<()> {
        let continuing = self.last_command.as_ref().is_some_and(CommandId::is_undo);
        let buffer = self.current_mut();
        if buffer.read_only && !inhibit_read_only {
            return Err(CursorUndoError::BufferReadOnly);
        }
        if !continuing || buffer.pending.is_none() {
            let mut pending: Vec<_> = buffer.undo_log.iter().cloned().collect();
            if pending.first().is_some_and(UndoLogEntry::is_boundary) {
                pending.remove(0);
            }
            buffer.pending = Some(pending);
        }

        let group = buffer.take_pending_group();
        if group.is_empty() {
            return Err(CursorUndoError::NoFurtherUndo);
        }
        buffer.undo_log.undo_boundary();
        for entry in group {
            self.replay_entry(entry);
        }
        self.current_mut().undo_log.undo_boundary();
        Ok(())
    }
}

impl CommandContext for MemoryHost {
    fn last_command(&self) -> Option<&CommandId> {
        self.last_command.as_ref()
    }

    fn this_command(&self) -> Option<&CommandId> {
        self.this_command.as_ref()
    }

    fn is_direct_invocation(&self) -> bool {
        self.direct
    }

    fn override_this_command(&mut self, command: CommandId) {
        self.this_command = Some(command);
    }
}
