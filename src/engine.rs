//! エンジン本体
//!
//! 追跡状態・登録テーブル・記録器・ガード・継続検出器をまとめ、
//! ホストのコマンド実行から呼び出す入口を提供する。

use crate::codec::CodecOptions;
use crate::config::EngineConfig;
use crate::continuation::{AlternateUndo, ContinuationDetector};
use crate::error::Result;
use crate::guard::ReadOnlyUndoGuard;
use crate::host::Host;
use crate::recorder::MovementRecorder;
use crate::registry::MovementRegistry;
use crate::tracking::{DisableScope, TrackingState};
use crate::undo_log::BufferId;

/// カーソル移動 Undo エンジン
#[derive(Debug, Clone)]
pub struct CursorUndo {
    tracking: TrackingState,
    registry: MovementRegistry,
    codec: CodecOptions,
    recorder: MovementRecorder,
    guard: ReadOnlyUndoGuard,
    detector: ContinuationDetector,
}

impl CursorUndo {
    /// 設定からエンジンを作成する
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let registry = MovementRegistry::from_config(config)?;
        Ok(Self::with_registry(registry, config))
    }

    /// 登録テーブルを指定してエンジンを作成する
    pub fn with_registry(registry: MovementRegistry, config: &EngineConfig) -> Self {
        let tracking = TrackingState::new(config.enabled);
        log::debug!(
            "cursor undo engine created with {} movement commands (enabled: {})",
            registry.len(),
            config.enabled
        );
        let guard = ReadOnlyUndoGuard::new();
        Self {
            recorder: MovementRecorder::new(tracking.clone()),
            tracking,
            registry,
            codec: config.codec_options(),
            guard,
            detector: ContinuationDetector::new(guard),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.tracking.set_global_enabled(enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.tracking.is_global_enabled()
    }

    pub fn tracking(&self) -> &TrackingState {
        &self.tracking
    }

    pub fn registry(&self) -> &MovementRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut MovementRegistry {
        &mut self.registry
    }

    /// ホストの Undo 再生時に使うログ整理の設定
    pub fn codec_options(&self) -> CodecOptions {
        self.codec
    }

    /// 移動コマンドを実行する
    ///
    /// 登録済みのコマンドなら記録器を通し、未登録ならそのまま実行する。
    pub fn run_movement<H, T, E, F>(&self, command: &str, host: &mut H, op: F) -> std::result::Result<T, E>
    where
        H: Host + ?Sized,
        F: FnOnce(&mut H) -> std::result::Result<T, E>,
    {
        match self.registry.get(command) {
            Some(movement) => self.recorder.record(host, movement, op),
            None => op(host),
        }
    }

    /// スコープの間バッファの追跡を無効化する
    pub fn disable_scope(&self, buffer: BufferId, reason: &'static str) -> DisableScope {
        self.tracking.disable_scope(buffer, reason)
    }

    /// カレントバッファの追跡を無効化して `f` を実行する
    pub fn without_tracking<H, T, F>(&self, host: &mut H, reason: &'static str, f: F) -> T
    where
        H: Host + ?Sized,
        F: FnOnce(&mut H) -> T,
    {
        let _scope = self.disable_scope(host.current_buffer(), reason);
        f(host)
    }

    /// 読み取り専用ガード付きの Undo
    pub fn undo<H: Host + ?Sized>(&self, host: &mut H) -> Result<()> {
        self.guard.undo(host)
    }

    /// 別実装の Undo コマンドを実行する
    pub fn alternate_undo<H, T, F>(&self, host: &mut H, secondary: F) -> Result<AlternateUndo<T>>
    where
        H: Host + ?Sized,
        F: FnOnce(&mut H) -> Result<T>,
    {
        self.detector.run(host, secondary)
    }
}
