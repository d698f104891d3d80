//! 追跡状態管理
//!
//! グローバルな有効フラグと、バッファごとの入れ子可能な無効化スタックを保持する。
//! 無効化と一時停止はスコープガードで管理し、通常終了・エラー伝播・巻き戻しの
//! どの経路でも必ず元の状態に戻す。

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::undo_log::BufferId;

/// 追跡状態
///
/// 複製したハンドルは同じ状態を共有する。
#[derive(Debug, Clone)]
pub struct TrackingState {
    inner: Rc<RefCell<TrackingInner>>,
}

#[derive(Debug)]
struct TrackingInner {
    enabled: bool,
    suspended: bool,
    disabled: HashMap<BufferId, Vec<&'static str>>,
}

impl Default for TrackingState {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TrackingState {
    pub fn new(enabled: bool) -> Self {
        Self {
            inner: Rc::new(RefCell::new(TrackingInner {
                enabled,
                suspended: false,
                disabled: HashMap::new(),
            })),
        }
    }

    /// モードの有効・無効を切り替える
    pub fn set_global_enabled(&self, enabled: bool) {
        self.inner.borrow_mut().enabled = enabled;
    }

    pub fn is_global_enabled(&self) -> bool {
        self.inner.borrow().enabled
    }

    /// バッファの追跡を無効化する
    pub fn push_local_disable(&self, buffer: BufferId, reason: &'static str) {
        let mut inner = self.inner.borrow_mut();
        let stack = inner.disabled.entry(buffer).or_default();
        stack.push(reason);
        log::trace!("tracking disabled for buffer {} ({}), depth {}", buffer, reason, stack.len());
    }

    /// 直近の無効化を解除する
    pub fn pop_local_disable(&self, buffer: BufferId) {
        let mut inner = self.inner.borrow_mut();
        let Some(stack) = inner.disabled.get_mut(&buffer) else {
            log::warn!("unbalanced pop of tracking disable for buffer {}", buffer);
            return;
        };
        stack.pop();
        if stack.is_empty() {
            inner.disabled.remove(&buffer);
        }
    }

    /// 無効化スタックの深さ
    pub fn local_disable_depth(&self, buffer: BufferId) -> usize {
        self.inner
            .borrow()
            .disabled
            .get(&buffer)
            .map_or(0, Vec::len)
    }

    /// 追跡が現在有効か
    pub fn is_active(&self, buffer: BufferId) -> bool {
        let inner = self.inner.borrow();
        inner.enabled && !inner.suspended && !inner.disabled.contains_key(&buffer)
    }

    /// スコープの間バッファの追跡を無効化する
    pub fn disable_scope(&self, buffer: BufferId, reason: &'static str) -> DisableScope {
        self.push_local_disable(buffer, reason);
        DisableScope {
            state: self.clone(),
            buffer,
        }
    }

    /// スコープの間すべての追跡を一時停止する
    pub(crate) fn suspend(&self) -> SuspendGuard {
        let previous = std::mem::replace(&mut self.inner.borrow_mut().suspended, true);
        SuspendGuard {
            state: self.clone(),
            previous,
        }
    }
}

/// 無効化スコープ（破棄時に無効化を解除する）
#[must_use = "tracking is re-enabled as soon as the scope is dropped"]
#[derive(Debug)]
pub struct DisableScope {
    state: TrackingState,
    buffer: BufferId,
}

impl DisableScope {
    pub fn buffer(&self) -> BufferId {
        self.buffer
    }
}

impl Drop for DisableScope {
    fn drop(&mut self) {
        self.state.pop_local_disable(self.buffer);
    }
}

/// 一時停止ガード（破棄時に停止前の状態へ戻す）
#[derive(Debug)]
pub(crate) struct SuspendGuard {
    state: TrackingState,
    previous: bool,
}

impl Drop for SuspendGuard {
    fn drop(&mut self) {
        self.state.inner.borrow_mut().suspended = self.previous;
    }
}
