//! cursor-undo - カーソル移動の Undo
//!
//! カーソル・表示位置の移動を編集と同じ Undo の仕組みで取り消せるようにする。
//! 同じ方向への連続移動は1ステップにまとめ、検索やジャンプは個別に取り消せる。

// コアモジュール
pub mod config;
pub mod error;

// データ層
pub mod codec;
pub mod undo_log;

// ホスト連携
pub mod host;

// ロジック層
pub mod continuation;
pub mod engine;
pub mod guard;
pub mod recorder;
pub mod registry;
pub mod tracking;

// 公開API
pub use codec::CodecOptions;
pub use config::{CommandSpec, EngineConfig};
pub use continuation::{AlternateUndo, ContinuationDetector};
pub use engine::CursorUndo;
pub use error::{ConfigError, CursorUndoError, ErrorLevel, Result};
pub use guard::{PendingStep, ReadOnlyUndoGuard};
pub use host::{BufferModel, CommandContext, CommandId, Host, MemoryHost, UndoStore};
pub use recorder::{MovementRecorder, RecordDecision, SkipReason, TrackingContext};
pub use registry::{MovementFlags, MovementRegistry, RegisteredMovement};
pub use tracking::{DisableScope, TrackingState};
pub use undo_log::{ActionKind, BufferId, BufferOffset, EditRecord, UndoLog, UndoLogEntry};
