#![deny(unsafe_code)]

//! # spark-config-realtime
//!
//! ## 定位与职责（Why）
//! - 为分层配置管线提供一个可在运行时读写的内存配置层：调用方修改后，读取合并视图的任何消费者立即看到新值；
//! - 保留 `section:subsection:key` 的层级语义，按需重建某一层的直接子段，供宿主的分节与绑定逻辑遍历。
//!
//! ## 架构嵌入（Where）
//! - `store`：并发安全的键值仓储，乐观比较并重试写入，每次可观测变化恰好一次重载通知；
//! - `hierarchy`：纯函数形式的层级枚举，依赖存储的键快照；
//! - `provider` 与 `registrar`：面向宿主管线的薄适配层与注册入口；
//! - `key`、`value`、`reload`、`options`、`error`：共享的基础类型。
//!
//! ## 使用示例
//! ```
//! use spark_config_realtime::RealtimeStore;
//!
//! let store = RealtimeStore::new();
//! store.set("db:host", "localhost").unwrap();
//! store.set("db:port", "5432").unwrap();
//! assert_eq!(store.try_get("DB:HOST").unwrap(), "localhost");
//! assert_eq!(store.child_keys(Vec::<String>::new(), Some("db")), ["host", "port"]);
//! ```
//!
//! ## 非目标（Trade-offs）
//! - 不持久化、不跨进程同步、不校验值的类型；
//! - 只支持单层子段枚举，不支持通配或 glob 查询。

pub mod error;
pub mod hierarchy;
pub mod key;
pub mod options;
pub mod provider;
pub mod registrar;
pub mod reload;
pub mod store;
pub mod value;

pub use error::RealtimeConfigError;
pub use key::{ConfigKey, KEY_DELIMITER};
pub use options::StoreOptions;
pub use provider::{
    ConfigurationProvider, ConfigurationSource, RealtimeConfigurationProvider, RealtimeProvider,
    RealtimeSource,
};
pub use registrar::{
    ConfigurationBuilder, ServiceRegistry, add_realtime_configuration,
    add_realtime_configuration_and_register, add_realtime_configuration_with,
    register_realtime_singleton,
};
pub use reload::{ReloadSignal, ReloadToken, SubscriptionId};
pub use store::{RealtimeStore, SetOutcome};
pub use value::ConfigValue;
