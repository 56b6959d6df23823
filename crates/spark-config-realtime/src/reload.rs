//! 重载通知：边沿触发、不携带负载的“状态已变化”信号。
//!
//! # 教案式说明
//! - **意图 (Why)**：宿主管线缓存了合并后的配置视图，需要在任何一层发生可观测变化时失效缓存；
//!   通知只表达“变了”，消费者收到后必须重新查询。
//! - **契约 (What)**：
//!   - [`ReloadToken`] 是一次性的变更令牌：至多触发一次，触发后 `has_changed()` 恒为 `true`；
//!   - [`ReloadSignal::notify`] 原子地换上新令牌、递增纪元、触发旧令牌，然后调用持久监听器；
//!   - 回调在调用 `notify` 的线程上执行，且执行时不持有任何存储锁，回调内可以重入存储。
//! - **实现 (How)**：当前令牌放在 `ArcSwap` 中，读者无锁获取；令牌内部用 `AtomicBool::swap`
//!   保证只触发一次，回调列表由 `parking_lot::Mutex` 保护；`--cfg spark_loom` 下二者换成 Loom 类型。

use std::{
    fmt, mem,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use arc_swap::ArcSwap;
use parking_lot::RwLock;

// Loom 模型检查时，令牌内部的原子位与回调锁切换为 Loom 类型，以便穷举注册与触发的交错；
// 常规构建保持 `std` 原子与 `parking_lot::Mutex`。
#[cfg(any(loom, spark_loom))]
use loom::sync::{Mutex, MutexGuard, atomic::AtomicBool};
#[cfg(not(any(loom, spark_loom)))]
use parking_lot::{Mutex, MutexGuard};
#[cfg(not(any(loom, spark_loom)))]
use std::sync::atomic::AtomicBool;

type TokenCallback = Box<dyn FnOnce() + Send + 'static>;
type Listener = Arc<dyn Fn(u64) + Send + Sync + 'static>;

struct TokenState {
    fired: AtomicBool,
    callbacks: Mutex<Vec<TokenCallback>>,
}

impl TokenState {
    fn new() -> Self {
        Self {
            fired: AtomicBool::new(false),
            callbacks: Mutex::new(Vec::new()),
        }
    }

    #[cfg(not(any(loom, spark_loom)))]
    fn callbacks(&self) -> MutexGuard<'_, Vec<TokenCallback>> {
        self.callbacks.lock()
    }

    #[cfg(any(loom, spark_loom))]
    fn callbacks(&self) -> MutexGuard<'_, Vec<TokenCallback>> {
        // 持锁期间不执行回调，锁不会被毒化。
        self.callbacks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// 一次性变更令牌。
///
/// # 教案式说明
/// - **意图 (Why)**：对齐宿主管线的“取令牌 -> 注册回调 -> 令牌失效后重新取”模式，
///   调用方可以在读取配置前先取令牌，从而不会错过读取与注册之间发生的变化。
/// - **契约 (What)**：
///   - [`register`](Self::register) 的回调恰好执行一次：令牌尚未触发时延迟到触发时执行，
///     已触发时立即在当前线程执行；
///   - 克隆得到的句柄共享同一状态。
#[derive(Clone)]
pub struct ReloadToken {
    state: Arc<TokenState>,
}

impl ReloadToken {
    fn from_state(state: Arc<TokenState>) -> Self {
        Self { state }
    }

    /// 令牌是否已触发。
    #[inline]
    pub fn has_changed(&self) -> bool {
        self.state.fired.load(Ordering::Acquire)
    }

    /// 注册一次性回调。
    pub fn register<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut callbacks = self.state.callbacks();
        if self.state.fired.load(Ordering::Acquire) {
            drop(callbacks);
            callback();
            return;
        }
        callbacks.push(Box::new(callback));
    }

    /// 触发令牌；返回 `false` 表示此前已经触发过。
    fn fire(&self) -> bool {
        if self.state.fired.swap(true, Ordering::AcqRel) {
            return false;
        }
        let callbacks = mem::take(&mut *self.state.callbacks());
        for callback in callbacks {
            callback();
        }
        true
    }
}

impl fmt::Debug for ReloadToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReloadToken")
            .field("has_changed", &self.has_changed())
            .finish()
    }
}

/// 持久监听器的注册标识。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// 重载信号源。
///
/// # 教案式说明
/// - **意图 (Why)**：一次性令牌适合宿主管线，长期订阅者（如缓存失效器）则希望每次变化都被回调；
///   两种形态共用一个纪元计数，便于测试与观测。
/// - **契约 (What)**：
///   - [`epoch`](Self::epoch) 单调递增，每次 `notify` 加一；
///   - 监听器收到的参数是本次通知对应的纪元；
///   - 监听器列表在调用前被快照，回调期间的订阅/退订不影响本轮分发。
/// - **风险 (Trade-offs)**：回调在写线程上同步执行，耗时回调会拖慢 `set`；重活应转交其他线程。
pub struct ReloadSignal {
    current: ArcSwap<TokenState>,
    epoch: AtomicU64,
    next_subscription: AtomicU64,
    listeners: RwLock<Vec<(SubscriptionId, Listener)>>,
}

impl Default for ReloadSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ReloadSignal {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(TokenState::new()),
            epoch: AtomicU64::new(0),
            next_subscription: AtomicU64::new(0),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// 当前尚未触发的令牌。
    pub fn token(&self) -> ReloadToken {
        ReloadToken::from_state(self.current.load_full())
    }

    /// 已发出的通知次数。
    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// 注册持久监听器。
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, Arc::new(listener)));
        id
    }

    /// 注销监听器；返回是否存在该监听器。
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// 当前监听器数量。
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// 发出一次重载通知，返回新的纪元。
    pub fn notify(&self) -> u64 {
        let retired = self.current.swap(Arc::new(TokenState::new()));
        let epoch = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        ReloadToken::from_state(retired).fire();

        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(epoch);
        }
        epoch
    }
}

impl fmt::Debug for ReloadSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReloadSignal")
            .field("epoch", &self.epoch())
            .field("listeners", &self.listener_count())
            .finish()
    }
}
