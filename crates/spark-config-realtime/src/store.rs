//! # RealtimeStore：可运行时读写的配置仓储
//!
//! ## 核心意图（Why）
//! - 以 `DashMap` 分片并发映射保存“完整键 -> 可选值”，读写互不阻塞无关键，无需全局锁；
//! - 每一次可观测变化恰好触发一次重载通知，值未变的写入不产生通知，避免宿主管线无谓地重建视图。
//!
//! ## 行为契约（What）
//! - `try_get`：忽略大小写的点查，返回 `None` 表示键不存在；
//! - `set`：乐观“比较并重试”写入，返回 [`SetOutcome`]；
//! - `remove`：存在则删除并通知，返回旧值；
//! - `child_keys`：对同一份键快照调用 [`hierarchy::child_keys`](crate::hierarchy::child_keys)；
//! - 所有通知都在映射已对后续读可见、且分片锁已释放之后发出（先发布后通知）。
//!
//! ## 风险提示（Trade-offs）
//! - 不提供跨键原子性：读者可能看到键 A 的新值与键 B 的旧值同时存在；
//! - 通知回调在写线程上同步执行，回调过重会放大 `set` 的延迟。

use std::fmt;

use dashmap::{DashMap, mapref::entry::Entry};
use tracing::{debug, trace, warn};

use crate::{
    error::RealtimeConfigError,
    hierarchy,
    key::{ConfigKey, compare_total},
    options::StoreOptions,
    reload::{ReloadSignal, ReloadToken, SubscriptionId},
    value::ConfigValue,
};

/// 一次 `set` 的结局。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SetOutcome {
    /// 新插入条目。
    Inserted,
    /// 覆盖了不同的旧值。
    Updated { previous: ConfigValue },
    /// 新值与现值逐字节相同，未做任何修改，也未通知。
    Unchanged,
}

impl SetOutcome {
    /// 是否产生了可观测变化。
    #[inline]
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// 实时配置仓储。
///
/// # 教案式注释
/// - **意图 (Why)**：封装并发映射与重载信号，上层只通过 `set`/`remove` 改变状态，
///   从而保证“每次变化恰好一次通知”的不变量不会被绕过。
/// - **契约 (What)**：
///   - 任一时刻每个忽略大小写的键至多一个条目；
///   - 条目保留首次写入时的键拼写，后续大小写不同的写入只更新值；
///   - 创建时为空，生命周期与持有者一致，无终态。
/// - **风险 (Trade-offs)**：点查需为查询键分配一次 `Arc<str>`；热点场景可改为持有 [`ConfigKey`] 复用。
pub struct RealtimeStore {
    entries: DashMap<ConfigKey, ConfigValue>,
    reload: ReloadSignal,
    options: StoreOptions,
}

impl Default for RealtimeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeStore {
    /// 创建采用宽松键策略的空仓储。
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    /// 创建采用指定键策略的空仓储。
    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            entries: DashMap::new(),
            reload: ReloadSignal::new(),
            options,
        }
    }

    /// 当前键策略。
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// 点查。
    ///
    /// - **契约 (What)**：`None` 表示不存在；`Some` 中可能是调用方写入的 null 占位；
    /// - **副作用**：无。
    pub fn try_get(&self, key: &str) -> Option<ConfigValue> {
        if !self.options.admits(key) {
            return None;
        }
        self.entries
            .get(&ConfigKey::new(key))
            .map(|slot| slot.value().clone())
    }

    /// 是否存在该键。
    pub fn contains_key(&self, key: &str) -> bool {
        self.options.admits(key) && self.entries.contains_key(&ConfigKey::new(key))
    }

    /// 写入或覆盖条目。
    ///
    /// # 教案式注释
    /// - **意图 (Why)**：运行时修改配置并让合并视图立即感知；
    /// - **契约 (What)**：
    ///   - 键不满足 [`StoreOptions`] 时返回错误，状态与通知均不受影响；
    ///   - 现值与新值逐字节相同时返回 [`SetOutcome::Unchanged`]，不通知；
    ///   - 否则插入或覆盖，并在返回前恰好通知一次；
    /// - **执行 (How)**：见 [`compare_and_retry`](Self::compare_and_retry)。
    pub fn set<V>(&self, key: &str, value: V) -> Result<SetOutcome, RealtimeConfigError>
    where
        V: Into<ConfigValue>,
    {
        if let Err(error) = self.options.validate_key(key) {
            warn!(key, %error, "rejected configuration key");
            return Err(error);
        }

        let key = ConfigKey::new(key);
        let outcome = self.compare_and_retry(&key, value.into());
        match &outcome {
            SetOutcome::Inserted => debug!(key = %key, "configuration entry inserted"),
            SetOutcome::Updated { .. } => debug!(key = %key, "configuration entry updated"),
            SetOutcome::Unchanged => trace!(key = %key, "configuration entry unchanged"),
        }
        if outcome.is_change() {
            self.reload.notify();
        }
        Ok(outcome)
    }

    /// 乐观的比较并重试循环。
    ///
    /// 1. 无锁读取现值；若与新值相同直接返回 `Unchanged`，不获取写锁；
    /// 2. 取得该键所在分片的写入口，仅当现值仍等于第 1 步的观测值时才写入（条件更新）；
    /// 3. 观测值已过期（竞争失败）则回到第 1 步。
    ///
    /// 每轮失败都意味着另一写者在两步之间完成了写入，因此循环次数受竞争写者数量约束。
    fn compare_and_retry(&self, key: &ConfigKey, value: ConfigValue) -> SetOutcome {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let observed = self.entries.get(key).map(|slot| slot.value().clone());
            if observed.as_ref() == Some(&value) {
                return SetOutcome::Unchanged;
            }

            match self.entries.entry(key.clone()) {
                Entry::Occupied(mut occupied) => {
                    if observed.as_ref() == Some(occupied.get()) {
                        let previous = occupied.insert(value);
                        return SetOutcome::Updated { previous };
                    }
                }
                Entry::Vacant(vacant) => {
                    if observed.is_none() {
                        vacant.insert(value);
                        return SetOutcome::Inserted;
                    }
                }
            }

            trace!(key = %key, attempt, "lost configuration write race, retrying");
        }
    }

    /// 删除条目，返回被删除的值；不存在时不通知。
    pub fn remove(&self, key: &str) -> Option<ConfigValue> {
        if !self.options.admits(key) {
            return None;
        }
        let (removed_key, previous) = self.entries.remove(&ConfigKey::new(key))?;
        debug!(key = %removed_key, "configuration entry removed");
        self.reload.notify();
        Some(previous)
    }

    /// 删除全部条目；若确有删除则恰好通知一次，返回删除数量。
    ///
    /// 逐键删除，期间并发写入的新键可能保留下来。
    pub fn clear(&self) -> usize {
        let removed = self
            .keys()
            .into_iter()
            .filter(|key| self.entries.remove(key).is_some())
            .count();
        if removed > 0 {
            debug!(removed, "configuration store cleared");
            self.reload.notify();
        }
        removed
    }

    /// 条目数量。
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 当前键集合的快照（无序）。
    ///
    /// `DashMap` 的遍历逐分片加读锁，不会产生重复或残缺的键。
    pub fn keys(&self) -> Vec<ConfigKey> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    /// 全部条目的快照，按键全序排序。
    pub fn snapshot(&self) -> Vec<(ConfigKey, ConfigValue)> {
        let mut entries: Vec<(ConfigKey, ConfigValue)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        entries.sort_by(|(a, _), (b, _)| compare_total(a.as_str(), b.as_str()));
        entries
    }

    /// 层级枚举：`parent_path` 下的直接子段与 `earlier_keys` 合并排序。
    pub fn child_keys<E, S>(&self, earlier_keys: E, parent_path: Option<&str>) -> Vec<String>
    where
        E: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let snapshot = self.keys();
        hierarchy::child_keys(earlier_keys, parent_path, snapshot)
    }

    /// 当前的一次性重载令牌。
    pub fn reload_token(&self) -> ReloadToken {
        self.reload.token()
    }

    /// 注册持久重载监听器，参数为通知纪元。
    pub fn on_reload<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        self.reload.subscribe(listener)
    }

    /// 注销持久监听器。
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.reload.unsubscribe(id)
    }

    /// 已发出的重载通知次数。
    pub fn reload_epoch(&self) -> u64 {
        self.reload.epoch()
    }
}

impl fmt::Debug for RealtimeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealtimeStore")
            .field("entries", &self.entries.len())
            .field("reload", &self.reload)
            .field("options", &self.options)
            .finish()
    }
}
