//! 移動コマンドの登録テーブル
//!
//! どのコマンドをどのフラグで記録対象にするかを管理する。
//! フラグは登録時に検証し、何も記録しない組み合わせは拒否する。

use std::collections::HashMap;

use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::host::CommandId;

/// 移動コマンドごとの記録フラグ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MovementFlags {
    /// 同じコマンドの連続実行を1ステップにまとめない
    pub no_combine: bool,
    /// 表示開始位置も記録する
    pub screen_pos: bool,
    /// カーソル位置を記録しない
    pub no_move: bool,
}

impl MovementFlags {
    /// 連続実行をまとめる通常の移動
    pub const COMBINED: Self = Self::new(false, false, false);
    /// 1回ごとに独立したステップになるジャンプ
    pub const JUMP: Self = Self::new(true, false, false);
    /// 表示位置も変わる移動（スクロールなど）
    pub const SCREEN: Self = Self::new(false, true, false);
    /// 表示位置も変わるジャンプ
    pub const SCREEN_JUMP: Self = Self::new(true, true, false);
    /// 表示位置だけが変わる操作（再センタリングなど）
    pub const SCREEN_ONLY: Self = Self::new(false, true, true);

    pub const fn new(no_combine: bool, screen_pos: bool, no_move: bool) -> Self {
        Self {
            no_combine,
            screen_pos,
            no_move,
        }
    }

    /// 何かしらを記録する組み合わせか検証する
    pub fn validate(&self, command: &str) -> Result<(), ConfigError> {
        if !self.screen_pos && self.no_move {
            return Err(ConfigError::RecordsNothing {
                command: command.to_string(),
            });
        }
        Ok(())
    }
}

/// 検証済みの登録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredMovement {
    command: CommandId,
    flags: MovementFlags,
}

impl RegisteredMovement {
    pub fn command(&self) -> &CommandId {
        &self.command
    }

    pub fn flags(&self) -> MovementFlags {
        self.flags
    }
}

/// 組み込みの移動コマンド表
const DEFAULT_MOVEMENTS: &[(&str, MovementFlags)] = &[
    // 文字・単語
    ("forward-char", MovementFlags::COMBINED),
    ("backward-char", MovementFlags::COMBINED),
    ("right-char", MovementFlags::COMBINED),
    ("left-char", MovementFlags::COMBINED),
    ("forward-word", MovementFlags::COMBINED),
    ("backward-word", MovementFlags::COMBINED),
    ("right-word", MovementFlags::COMBINED),
    ("left-word", MovementFlags::COMBINED),
    // 行
    ("next-line", MovementFlags::COMBINED),
    ("previous-line", MovementFlags::COMBINED),
    ("beginning-of-line", MovementFlags::COMBINED),
    ("end-of-line", MovementFlags::COMBINED),
    ("move-beginning-of-line", MovementFlags::COMBINED),
    ("move-end-of-line", MovementFlags::COMBINED),
    ("beginning-of-visual-line", MovementFlags::COMBINED),
    ("end-of-visual-line", MovementFlags::COMBINED),
    ("back-to-indentation", MovementFlags::COMBINED),
    // 文・段落・式
    ("forward-sentence", MovementFlags::COMBINED),
    ("backward-sentence", MovementFlags::COMBINED),
    ("forward-paragraph", MovementFlags::COMBINED),
    ("backward-paragraph", MovementFlags::COMBINED),
    ("forward-sexp", MovementFlags::COMBINED),
    ("backward-sexp", MovementFlags::COMBINED),
    ("forward-list", MovementFlags::COMBINED),
    ("backward-list", MovementFlags::COMBINED),
    ("up-list", MovementFlags::COMBINED),
    ("backward-up-list", MovementFlags::COMBINED),
    ("down-list", MovementFlags::COMBINED),
    ("beginning-of-defun", MovementFlags::COMBINED),
    ("end-of-defun", MovementFlags::COMBINED),
    // スクロール
    ("scroll-up-command", MovementFlags::SCREEN),
    ("scroll-down-command", MovementFlags::SCREEN),
    ("scroll-up-line", MovementFlags::SCREEN),
    ("scroll-down-line", MovementFlags::SCREEN),
    ("scroll-left", MovementFlags::SCREEN),
    ("scroll-right", MovementFlags::SCREEN),
    ("scroll-other-window", MovementFlags::SCREEN_ONLY),
    ("scroll-other-window-down", MovementFlags::SCREEN_ONLY),
    ("recenter-top-bottom", MovementFlags::SCREEN_ONLY),
    ("reposition-window", MovementFlags::SCREEN_ONLY),
    ("move-to-window-line-top-bottom", MovementFlags::SCREEN),
    // バッファ端
    ("beginning-of-buffer", MovementFlags::JUMP),
    ("end-of-buffer", MovementFlags::JUMP),
    // 検索・ジャンプ
    ("isearch-forward", MovementFlags::SCREEN_JUMP),
    ("isearch-backward", MovementFlags::SCREEN_JUMP),
    ("isearch-forward-regexp", MovementFlags::SCREEN_JUMP),
    ("isearch-backward-regexp", MovementFlags::SCREEN_JUMP),
    ("search-forward", MovementFlags::SCREEN_JUMP),
    ("search-backward", MovementFlags::SCREEN_JUMP),
    ("goto-line", MovementFlags::SCREEN_JUMP),
    ("goto-char", MovementFlags::SCREEN_JUMP),
    ("move-to-column", MovementFlags::JUMP),
    ("exchange-point-and-mark", MovementFlags::SCREEN_JUMP),
    ("pop-to-mark-command", MovementFlags::SCREEN_JUMP),
    ("pop-global-mark", MovementFlags::SCREEN_JUMP),
    ("bookmark-jump", MovementFlags::SCREEN_JUMP),
    ("xref-find-definitions", MovementFlags::SCREEN_JUMP),
    ("xref-go-back", MovementFlags::SCREEN_JUMP),
    ("imenu", MovementFlags::SCREEN_JUMP),
    ("mouse-set-point", MovementFlags::JUMP),
    ("mouse-drag-region", MovementFlags::JUMP),
    ("mark-whole-buffer", MovementFlags::JUMP),
];

/// 移動コマンドの登録テーブル
#[derive(Debug, Clone, Default)]
pub struct MovementRegistry {
    movements: HashMap<CommandId, RegisteredMovement>,
}

impl MovementRegistry {
    /// 空のテーブルを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 組み込みの移動コマンドを登録したテーブルを作成
    pub fn with_defaults() -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for (command, flags) in DEFAULT_MOVEMENTS {
            registry.register(*command, *flags)?;
        }
        Ok(registry)
    }

    /// 設定からテーブルを作成（設定側の登録が組み込みを上書きする）
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        let mut registry = if config.use_default_commands {
            Self::with_defaults()?
        } else {
            Self::new()
        };
        for spec in &config.commands {
            registry.register(spec.command.as_str(), spec.flags())?;
        }
        Ok(registry)
    }

    /// コマンドを登録する（同名の登録は置き換える）
    pub fn register(
        &mut self,
        command: impl Into<CommandId>,
        flags: MovementFlags,
    ) -> Result<&RegisteredMovement, ConfigError> {
        let command = command.into();
        flags.validate(command.as_str())?;
        let movement = RegisteredMovement {
            command: command.clone(),
            flags,
        };
        self.movements.insert(command.clone(), movement);
        Ok(&self.movements[command.as_str()])
    }

    pub fn unregister(&mut self, command: &str) -> Option<RegisteredMovement> {
        self.movements.remove(command)
    }

    pub fn get(&self, command: &str) -> Option<&RegisteredMovement> {
        self.movements.get(command)
    }

    pub fn contains(&self, command: &str) -> bool {
        self.movements.contains_key(command)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredMovement> {
        self.movements.values()
    }

    pub fn len(&self) -> usize {
        self.movements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movements.is_empty()
    }
}
