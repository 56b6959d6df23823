//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 实时配置存储内部的竞争、重试与“值未变”均被就地吸收，唯一需要暴露给调用方的失败是
//!   “键不被接纳”：它会在下游造成不可恢复的键污染，因此必须在写入前快速失败；
//! - “键不存在”不是错误，由 `Option::None` 表达。
//!
//! ## 设计要求（What）
//! - 错误类型派生 `thiserror::Error`，可直接交给 `anyhow`/`eyre` 等上层框架；
//! - 变体携带触发错误的键，便于日志与排障。

use thiserror::Error;

/// 实时配置存储的错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：把 [`StoreOptions`](crate::StoreOptions) 中各项键准入规则的违反情况分开表达，
///   调用方可以据此区分“配置写错了”与“键被截断了”等不同原因。
/// - **契约 (What)**：所有变体均为 `Send + Sync + 'static`；返回该错误时存储状态未发生任何变化，
///   也不会触发重载通知。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum RealtimeConfigError {
    /// 当前策略不接受空键。
    #[error("configuration key must not be empty")]
    EmptyKey,

    /// 键长度超过上限（按字节计）。
    #[error("configuration key `{key}` is {len} bytes long, limit is {limit}")]
    KeyTooLong { key: String, len: usize, limit: usize },

    /// 键中包含控制字符。
    #[error("configuration key {key:?} contains a control character")]
    ControlCharacter { key: String },
}
