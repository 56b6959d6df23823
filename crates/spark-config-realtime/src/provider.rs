//! 宿主配置管线的接入契约与实时配置适配器。
//!
//! # 教案式说明
//! - **意图 (Why)**：宿主管线按层组合多个配置提供者并暴露统一索引；本模块只声明实时存储接入所需的
//!   最小读/写/枚举契约，存储本身不依赖这些 trait。
//! - **契约 (What)**：
//!   - [`ConfigurationProvider`]：宿主对每一层的要求（点查、写入、子段枚举、重载令牌）；
//!   - [`RealtimeConfigurationProvider`]：在此基础上放宽为允许运行时删除与持久订阅；
//!   - [`ConfigurationSource`]：宿主构建阶段用来产出提供者的工厂。
//! - **实现 (How)**：[`RealtimeProvider`] 持有 `Arc<RealtimeStore>` 并逐一委托；
//!   [`RealtimeSource`] 每次 `build` 都返回同一个提供者实例，保证外部持有的句柄与管线内部是同一份状态。

use std::sync::Arc;

use crate::{
    error::RealtimeConfigError,
    options::StoreOptions,
    reload::{ReloadToken, SubscriptionId},
    store::RealtimeStore,
    value::ConfigValue,
};

/// 宿主管线对单个配置层的要求。
pub trait ConfigurationProvider: Send + Sync {
    /// 忽略大小写的点查；`None` 表示本层没有该键。
    fn try_get(&self, key: &str) -> Option<ConfigValue>;

    /// 写入一个值。
    fn set(&self, key: &str, value: ConfigValue) -> Result<(), RealtimeConfigError>;

    /// 在 `earlier_keys` 基础上追加本层在 `parent_path` 下的直接子段，返回排序结果。
    fn child_keys(&self, earlier_keys: Vec<String>, parent_path: Option<&str>) -> Vec<String>;

    /// 当前的一次性重载令牌。
    fn reload_token(&self) -> ReloadToken;
}

/// 允许运行时修改的配置层。
pub trait RealtimeConfigurationProvider: ConfigurationProvider {
    /// 删除键；返回是否确有删除。
    fn remove(&self, key: &str) -> bool;

    /// 注册持久重载监听器。
    fn on_reload(&self, listener: Box<dyn Fn(u64) + Send + Sync>) -> SubscriptionId;
}

/// 宿主构建阶段的配置源。
pub trait ConfigurationSource: Send + Sync {
    fn build(&self) -> Arc<dyn ConfigurationProvider>;
}

/// 实时配置层适配器。
#[derive(Debug, Clone, Default)]
pub struct RealtimeProvider {
    store: Arc<RealtimeStore>,
}

impl RealtimeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: StoreOptions) -> Self {
        Self::from_store(Arc::new(RealtimeStore::with_options(options)))
    }

    pub fn from_store(store: Arc<RealtimeStore>) -> Self {
        Self { store }
    }

    /// 底层存储，供需要 [`SetOutcome`](crate::SetOutcome) 等细节的调用方使用。
    pub fn store(&self) -> &Arc<RealtimeStore> {
        &self.store
    }
}

impl ConfigurationProvider for RealtimeProvider {
    fn try_get(&self, key: &str) -> Option<ConfigValue> {
        self.store.try_get(key)
    }

    fn set(&self, key: &str, value: ConfigValue) -> Result<(), RealtimeConfigError> {
        self.store.set(key, value).map(|_| ())
    }

    fn child_keys(&self, earlier_keys: Vec<String>, parent_path: Option<&str>) -> Vec<String> {
        self.store.child_keys(earlier_keys, parent_path)
    }

    fn reload_token(&self) -> ReloadToken {
        self.store.reload_token()
    }
}

impl RealtimeConfigurationProvider for RealtimeProvider {
    fn remove(&self, key: &str) -> bool {
        self.store.remove(key).is_some()
    }

    fn on_reload(&self, listener: Box<dyn Fn(u64) + Send + Sync>) -> SubscriptionId {
        self.store.on_reload(listener)
    }
}

/// 把同一个 [`RealtimeProvider`] 交给宿主管线的配置源。
#[derive(Debug, Clone)]
pub struct RealtimeSource {
    provider: Arc<RealtimeProvider>,
}

impl RealtimeSource {
    pub fn new(provider: Arc<RealtimeProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<RealtimeProvider> {
        &self.provider
    }
}

impl ConfigurationSource for RealtimeSource {
    fn build(&self) -> Arc<dyn ConfigurationProvider> {
        Arc::clone(&self.provider) as Arc<dyn ConfigurationProvider>
    }
}
