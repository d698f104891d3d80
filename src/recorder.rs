//! カーソル移動の記録
//!
//! 移動コマンドの実行前後の状態を比較し、Undo ログに記録するか、
//! 直前の記録にまとめるか、何もしないかを決める。
//!
//! 記録する場合は次の順で1つのステップとして積む:
//!
//! 1. 表示開始位置の復元 (`screen_pos` のとき)
//! 2. カーソル位置 (`no_move` でないとき)
//! 3. 区切り

use crate::host::Host;
use crate::registry::{MovementFlags, RegisteredMovement};
use crate::tracking::TrackingState;
use crate::undo_log::{ActionKind, BufferId, BufferOffset, UndoLogEntry};

/// 1回の呼び出しの間だけ保持する実行前の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingContext {
    pub buffer: BufferId,
    pub prev_point: BufferOffset,
    pub prev_viewport_start: Option<BufferOffset>,
    pub tracking_was_active_at_entry: bool,
}

impl TrackingContext {
    fn capture<H: Host + ?Sized>(host: &H, flags: MovementFlags, was_active: bool) -> Self {
        let prev_viewport_start = if flags.screen_pos {
            host.viewport_start()
        } else {
            None
        };
        Self {
            buffer: host.current_buffer(),
            prev_point: host.point(),
            prev_viewport_start,
            tracking_was_active_at_entry: was_active,
        }
    }
}

/// 記録しなかった理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 呼び出し時点で追跡が無効だった
    Inactive,
    /// ユーザーの直接呼び出しではない
    IndirectCall,
    /// バッファで追跡が無効化されている
    LocallyDisabled,
    /// 同じコマンドの連続実行
    Repeated,
    /// カーソルが動いていない
    PointUnchanged,
    /// 同じ位置が既に記録されている
    AlreadyRecorded,
    /// 移動中にカレントバッファが切り替わった
    BufferSwitched,
    /// 表示位置だけを記録する移動だが、バッファがウィンドウに表示されていない
    NothingToRecord,
}

/// 記録の判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordDecision {
    Skip(SkipReason),
    Commit,
}

/// カーソル移動の記録器
#[derive(Debug, Clone)]
pub struct MovementRecorder {
    tracking: TrackingState,
}

impl MovementRecorder {
    pub fn new(tracking: TrackingState) -> Self {
        Self { tracking }
    }

    pub fn tracking(&self) -> &TrackingState {
        &self.tracking
    }

    /// 移動操作を実行し、必要なら Undo ログに記録する
    ///
    /// `op` の結果はそのまま返す。`op` が失敗した場合は何も記録しない。
    /// 実行中は追跡を一時停止するため、`op` の内部で呼ばれた移動は記録されない。
    pub fn record<H, T, E, F>(
        &self,
        host: &mut H,
        movement: &RegisteredMovement,
        op: F,
    ) -> Result<T, E>
    where
        H: Host + ?Sized,
        F: FnOnce(&mut H) -> Result<T, E>,
    {
        let flags = movement.flags();
        let was_active = self.tracking.is_active(host.current_buffer());
        let _suspended = self.tracking.suspend();

        let context = TrackingContext::capture(host, flags, was_active);
        let result = op(host)?;

        match self.decide(host, flags, &context) {
            RecordDecision::Commit => {
                commit(host, flags, &context);
                log::trace!(
                    "{}: recorded point {} (viewport {:?}) in buffer {}",
                    movement.command(),
                    context.prev_point,
                    context.prev_viewport_start,
                    context.buffer
                );
            }
            RecordDecision::Skip(reason) => {
                log::trace!("{}: not recorded ({:?})", movement.command(), reason);
            }
        }
        Ok(result)
    }

    /// 移動後の状態から記録するかを判定する
    pub fn decide<H: Host + ?Sized>(
        &self,
        host: &H,
        flags: MovementFlags,
        context: &TrackingContext,
    ) -> RecordDecision {
        use RecordDecision::Skip;

        if !context.tracking_was_active_at_entry {
            return Skip(SkipReason::Inactive);
        }
        if !host.is_direct_invocation() {
            return Skip(SkipReason::IndirectCall);
        }
        if self.tracking.local_disable_depth(context.buffer) > 0 {
            return Skip(SkipReason::LocallyDisabled);
        }
        if !flags.no_combine && is_repeated(host) {
            return Skip(SkipReason::Repeated);
        }
        if host.current_buffer() != context.buffer {
            return Skip(SkipReason::BufferSwitched);
        }
        if !flags.no_move && host.point() == context.prev_point {
            return Skip(SkipReason::PointUnchanged);
        }
        if flags.no_move && context.prev_viewport_start.is_none() {
            return Skip(SkipReason::NothingToRecord);
        }
        if matches!(
            host.undo_log().front_past_boundary(),
            Some(UndoLogEntry::PositionMarker(pos)) if *pos == context.prev_point
        ) {
            return Skip(SkipReason::AlreadyRecorded);
        }
        RecordDecision::Commit
    }
}

fn is_repeated<H: Host + ?Sized>(host: &H) -> bool {
    matches!(
        (host.last_command(), host.this_command()),
        (Some(last), Some(this)) if last == this
    )
}

fn commit<H: Host + ?Sized>(host: &mut H, flags: MovementFlags, context: &TrackingContext) {
    let log = host.undo_log_mut();
    if flags.screen_pos {
        if let Some(start) = context.prev_viewport_start {
            log.push(UndoLogEntry::ActionCall {
                kind: ActionKind::RestoreViewport,
                arg: start,
            });
        }
    }
    if !flags.no_move {
        log.push(UndoLogEntry::PositionMarker(context.prev_point));
    }
    log.undo_boundary();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{BufferModel, CommandContext, MemoryHost, UndoStore};
    use crate::registry::MovementRegistry;
    use crate::undo_log::UndoLog;

    fn registered(command: &str, flags: MovementFlags) -> RegisteredMovement {
        let mut registry = MovementRegistry::new();
        registry.register(command, flags).unwrap().clone()
    }

    fn forward(host: &mut MemoryHost, n: usize) -> Result<(), ()> {
        host.forward_char(n as isize);
        Ok(())
    }

    fn run(
        recorder: &MovementRecorder,
        host: &mut MemoryHost,
        movement: &RegisteredMovement,
        n: usize,
    ) {
        let command = movement.command().as_str().to_string();
        host.command(&command, |h| recorder.record(h, movement, |h| forward(h, n)))
            .unwrap();
    }

    fn marker(offset: usize) -> UndoLogEntry {
        UndoLogEntry::PositionMarker(BufferOffset::new(offset))
    }

    #[test]
    fn records_point_before_movement() {
        let recorder = MovementRecorder::new(TrackingState::new(true));
        let movement = registered("forward-char", MovementFlags::COMBINED);
        let mut host = MemoryHost::with_text("hello world");

        run(&recorder, &mut host, &movement, 3);
        assert_eq!(
            host.undo_log(),
            &UndoLog::from_entries(vec![UndoLogEntry::Boundary, marker(0)])
        );
    }

    #[test]
    fn screen_pos_records_viewport_before_point() {
        let recorder = MovementRecorder::new(TrackingState::new(true));
        let movement = registered("scroll-up-command", MovementFlags::SCREEN);
        let mut host = MemoryHost::with_text("line\n".repeat(40));
        host.set_viewport_start(BufferOffset::new(5));
        host.goto_char(7);

        host.command("scroll-up-command", |h| {
            recorder.record(h, &movement, |h| -> Result<(), ()> {
                h.set_viewport_start(BufferOffset::new(50));
                h.goto_char(52);
                Ok(())
            })
        })
        .unwrap();

        let entries: Vec<_> = host.undo_log().iter().cloned().collect();
        assert_eq!(
            entries,
            vec![
                UndoLogEntry::Boundary,
                marker(7),
                UndoLogEntry::ActionCall {
                    kind: ActionKind::RestoreViewport,
                    arg: BufferOffset::new(5),
                },
            ]
        );
    }

    #[test]
    fn screen_only_records_viewport_without_point() {
        let recorder = MovementRecorder::new(TrackingState::new(true));
        let movement = registered("recenter-top-bottom", MovementFlags::SCREEN_ONLY);
        let mut host = MemoryHost::with_text("line\n".repeat(40));
        host.set_viewport_start(BufferOffset::new(20));

        host.command("recenter-top-bottom", |h| {
            recorder.record(h, &movement, |h| -> Result<(), ()> {
                h.set_viewport_start(BufferOffset::new(0));
                Ok(())
            })
        })
        .unwrap();

        let (first, second) = host.undo_log().front_pair();
        assert_eq!(first, Some(&UndoLogEntry::Boundary));
        assert!(second.is_some_and(UndoLogEntry::is_restore_viewport));
        assert_eq!(host.undo_log().len(), 2);
    }

    #[test]
    fn undisplayed_buffer_records_point_only() {
        let recorder = MovementRecorder::new(TrackingState::new(true));
        let movement = registered("goto-line", MovementFlags::SCREEN_JUMP);
        let mut host = MemoryHost::with_text("line\n".repeat(10));
        host.detach_window();

        host.command("goto-line", |h| {
            recorder.record(h, &movement, |h| -> Result<(), ()> {
                h.goto_char(25);
                Ok(())
            })
        })
        .unwrap();
        assert_eq!(
            host.undo_log(),
            &UndoLog::from_entries(vec![UndoLogEntry::Boundary, marker(0)])
        );
    }

    #[test]
    fn screen_only_without_window_records_nothing() {
        let recorder = MovementRecorder::new(TrackingState::new(true));
        let movement = registered("recenter-top-bottom", MovementFlags::SCREEN_ONLY);
        let mut host = MemoryHost::with_text("line\n".repeat(10));
        host.detach_window();

        host.command("recenter-top-bottom", |h| {
            let context = TrackingContext {
                buffer: h.current_buffer(),
                prev_point: h.point(),
                prev_viewport_start: None,
                tracking_was_active_at_entry: true,
            };
            assert_eq!(
                recorder.decide(h, movement.flags(), &context),
                RecordDecision::Skip(SkipReason::NothingToRecord)
            );
            recorder.record(h, &movement, |_| -> Result<(), ()> { Ok(()) })
        })
        .unwrap();
        assert!(host.undo_log().is_empty());
    }

    #[test]
    fn unchanged_point_is_not_recorded() {
        let recorder = MovementRecorder::new(TrackingState::new(true));
        let movement = registered("forward-char", MovementFlags::COMBINED);
        let mut host = MemoryHost::with_text("abc");
        host.goto_char(3);

        run(&recorder, &mut host, &movement, 1);
        assert!(host.undo_log().is_empty());
    }

    #[test]
    fn repeated_command_merges_into_first_record() {
        let recorder = MovementRecorder::new(TrackingState::new(true));
        let movement = registered("forward-char", MovementFlags::COMBINED);
        let mut host = MemoryHost::with_text("hello world");

        for _ in 0..4 {
            run(&recorder, &mut host, &movement, 1);
        }
        assert_eq!(host.point(), BufferOffset::new(4));
        assert_eq!(
            host.undo_log(),
            &UndoLog::from_entries(vec![UndoLogEntry::Boundary, marker(0)])
        );
    }

    #[test]
    fn indirect_call_is_not_recorded() {
        let recorder = MovementRecorder::new(TrackingState::new(true));
        let movement = registered("goto-char", MovementFlags::JUMP);
        let mut host = MemoryHost::with_text("hello world");

        host.command("some-command", |h| {
            h.call_indirectly(|h| recorder.record(h, &movement, |h| forward(h, 5)))
        })
        .unwrap();
        assert_eq!(host.point(), BufferOffset::new(5));
        assert!(host.undo_log().is_empty());
    }

    #[test]
    fn inactive_tracking_is_not_recorded() {
        let tracking = TrackingState::new(true);
        let recorder = MovementRecorder::new(tracking.clone());
        let movement = registered("goto-char", MovementFlags::JUMP);
        let mut host = MemoryHost::with_text("hello world");

        tracking.set_global_enabled(false);
        run(&recorder, &mut host, &movement, 2);
        assert!(host.undo_log().is_empty());

        tracking.set_global_enabled(true);
        let buffer = host.current_buffer();
        let scope = tracking.disable_scope(buffer, "test");
        run(&recorder, &mut host, &movement, 2);
        assert!(host.undo_log().is_empty());

        drop(scope);
        run(&recorder, &mut host, &movement, 2);
        assert_eq!(host.undo_log().front_past_boundary(), Some(&marker(4)));
    }

    #[test]
    fn disable_pushed_during_movement_blocks_record() {
        let tracking = TrackingState::new(true);
        let recorder = MovementRecorder::new(tracking.clone());
        let movement = registered("goto-char", MovementFlags::JUMP);
        let mut host = MemoryHost::with_text("hello world");
        let buffer = host.current_buffer();

        host.command("goto-char", |h| {
            recorder.record(h, &movement, |h| -> Result<(), ()> {
                tracking.push_local_disable(buffer, "leaked");
                h.goto_char(6);
                Ok(())
            })
        })
        .unwrap();
        assert!(host.undo_log().is_empty());
    }

    #[test]
    fn failed_movement_records_nothing() {
        let tracking = TrackingState::new(true);
        let recorder = MovementRecorder::new(tracking.clone());
        let movement = registered("goto-char", MovementFlags::JUMP);
        let mut host = MemoryHost::with_text("hello world");

        let result = host.command("goto-char", |h| {
            recorder.record(h, &movement, |h| -> Result<(), &'static str> {
                h.goto_char(8);
                Err("quit")
            })
        });
        assert_eq!(result, Err("quit"));
        assert_eq!(host.point(), BufferOffset::new(8));
        assert!(host.undo_log().is_empty());
        assert!(tracking.is_active(host.current_buffer()));
    }

    #[test]
    fn nested_movement_is_recorded_once() {
        let recorder = MovementRecorder::new(TrackingState::new(true));
        let outer = registered("end-of-buffer", MovementFlags::JUMP);
        let inner = registered("goto-char", MovementFlags::JUMP);
        let mut host = MemoryHost::with_text("hello world");

        host.command("end-of-buffer", |h| {
            recorder.record(h, &outer, |h| {
                recorder.record(h, &inner, |h| -> Result<(), ()> {
                    h.goto_char(11);
                    Ok(())
                })
            })
        })
        .unwrap();
        assert_eq!(
            host.undo_log(),
            &UndoLog::from_entries(vec![UndoLogEntry::Boundary, marker(0)])
        );
    }

    #[test]
    fn position_already_at_front_is_not_recorded_again() {
        let recorder = MovementRecorder::new(TrackingState::new(true));
        let movement = registered("goto-char", MovementFlags::JUMP);
        let mut host = MemoryHost::with_text("hello world");
        host.undo_log_mut().push(marker(0));
        host.undo_log_mut().undo_boundary();

        run(&recorder, &mut host, &movement, 3);
        assert_eq!(host.undo_log().len(), 2);
    }

    #[test]
    fn buffer_switch_is_not_recorded() {
        let recorder = MovementRecorder::new(TrackingState::new(true));
        let movement = registered("bookmark-jump", MovementFlags::SCREEN_JUMP);
        let mut host = MemoryHost::with_text("hello world");
        let first = host.current_buffer();
        let other = host.create_buffer("notes", "other text");

        host.command("bookmark-jump", |h| {
            recorder.record(h, &movement, |h| h.switch_to_buffer(other))
        })
        .unwrap();
        assert_eq!(host.current_buffer(), other);
        assert!(host.undo_log().is_empty());
        host.switch_to_buffer(first).unwrap();
        assert!(host.undo_log().is_empty());
        assert_eq!(host.last_command().map(|c| c.as_str()), Some("bookmark-jump"));
    }
}
