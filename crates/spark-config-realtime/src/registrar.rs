//! 注册入口：构造实时配置层并挂到宿主管线与服务注册表上。
//!
//! 宿主的构建器与服务容器不属于本 crate，这里只声明挂载所需的最小 trait，由宿主实现。
//! 不存在隐式的全局单例：调用方拿到返回的 `Arc<RealtimeProvider>` 后自行传递。

use std::sync::Arc;

use tracing::debug;

use crate::{
    options::StoreOptions,
    provider::{
        ConfigurationSource, RealtimeConfigurationProvider, RealtimeProvider, RealtimeSource,
    },
};

/// 宿主配置构建器：按添加顺序组合配置源，后添加的层优先。
pub trait ConfigurationBuilder {
    fn add_source(&mut self, source: Box<dyn ConfigurationSource>);
}

/// 宿主服务注册表。
pub trait ServiceRegistry {
    /// 尝试注册单例；已有注册时保留原值并返回 `false`。
    fn try_add_realtime_provider(&mut self, provider: Arc<dyn RealtimeConfigurationProvider>)
    -> bool;
}

/// 以默认键策略创建实时配置层并加入构建器。
pub fn add_realtime_configuration<B>(builder: &mut B) -> Arc<RealtimeProvider>
where
    B: ConfigurationBuilder + ?Sized,
{
    add_realtime_configuration_with(builder, StoreOptions::default())
}

/// 以指定键策略创建实时配置层并加入构建器。
pub fn add_realtime_configuration_with<B>(
    builder: &mut B,
    options: StoreOptions,
) -> Arc<RealtimeProvider>
where
    B: ConfigurationBuilder + ?Sized,
{
    let provider = Arc::new(RealtimeProvider::with_options(options));
    builder.add_source(Box::new(RealtimeSource::new(Arc::clone(&provider))));
    debug!("realtime configuration source added");
    provider
}

/// 把已有的实时配置层注册为单例。
pub fn register_realtime_singleton<R>(services: &mut R, provider: Arc<RealtimeProvider>) -> bool
where
    R: ServiceRegistry + ?Sized,
{
    let added = services.try_add_realtime_provider(provider);
    if !added {
        debug!("realtime configuration provider already registered, keeping existing");
    }
    added
}

/// 创建实时配置层、加入构建器并注册为单例。
pub fn add_realtime_configuration_and_register<R, B>(
    services: &mut R,
    builder: &mut B,
) -> Arc<RealtimeProvider>
where
    R: ServiceRegistry + ?Sized,
    B: ConfigurationBuilder + ?Sized,
{
    let provider = add_realtime_configuration(builder);
    register_realtime_singleton(services, Arc::clone(&provider));
    provider
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ConfigurationProvider;

    #[derive(Default)]
    struct Builder {
        sources: Vec<Box<dyn ConfigurationSource>>,
    }

    impl ConfigurationBuilder for Builder {
        fn add_source(&mut self, source: Box<dyn ConfigurationSource>) {
            self.sources.push(source);
        }
    }

    #[derive(Default)]
    struct Registry {
        provider: Option<Arc<dyn RealtimeConfigurationProvider>>,
    }

    impl ServiceRegistry for Registry {
        fn try_add_realtime_provider(
            &mut self,
            provider: Arc<dyn RealtimeConfigurationProvider>,
        ) -> bool {
            if self.provider.is_some() {
                return false;
            }
            self.provider = Some(provider);
            true
        }
    }

    #[test]
    fn registration_wires_same_instance_everywhere() {
        let mut builder = Builder::default();
        let mut registry = Registry::default();
        let provider = add_realtime_configuration_and_register(&mut registry, &mut builder);

        assert_eq!(builder.sources.len(), 1);
        provider.store().set("k", "v").expect("set");

        let built = builder.sources[0].build();
        assert_eq!(built.try_get("K").as_ref().and_then(|v| v.as_deref()), Some("v"));

        let registered = registry.provider.as_ref().expect("registered");
        assert!(registered.remove("k"));
        assert!(provider.store().is_empty());
    }

    #[test]
    fn second_singleton_registration_is_ignored() {
        let mut registry = Registry::default();
        let first = Arc::new(RealtimeProvider::new());
        let second = Arc::new(RealtimeProvider::new());
        assert!(register_realtime_singleton(&mut registry, Arc::clone(&first)));
        assert!(!register_realtime_singleton(&mut registry, second));

        first.store().set("only", "first").expect("set");
        let registered = registry.provider.as_ref().expect("registered");
        assert!(registered.try_get("only").is_some());
    }
}
