//! 测试用的最小宿主管线：按添加顺序叠加配置层，后添加者优先。
//!
//! 只实现集成测试需要的部分：索引读取、分节子键遍历与聚合重载令牌。

#![allow(dead_code)]

use std::sync::{Arc, Weak};

use spark_config_realtime::{
    ConfigValue, ConfigurationBuilder, ConfigurationProvider, ConfigurationSource,
    RealtimeConfigError, ReloadSignal, ReloadToken, hierarchy,
    key::{self, eq_ignore_case},
};

/// 只读的静态层，模拟由文件加载的配置。
pub struct StaticProvider {
    entries: Vec<(String, String)>,
    reload: ReloadSignal,
}

impl StaticProvider {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            reload: ReloadSignal::new(),
        }
    }
}

impl ConfigurationProvider for StaticProvider {
    fn try_get(&self, key: &str) -> Option<ConfigValue> {
        self.entries
            .iter()
            .find(|(existing, _)| eq_ignore_case(existing, key))
            .map(|(_, value)| ConfigValue::from(value.as_str()))
    }

    fn set(&self, _key: &str, _value: ConfigValue) -> Result<(), RealtimeConfigError> {
        Ok(())
    }

    fn child_keys(&self, earlier_keys: Vec<String>, parent_path: Option<&str>) -> Vec<String> {
        hierarchy::child_keys(
            earlier_keys,
            parent_path,
            self.entries.iter().map(|(k, _)| k.as_str()),
        )
    }

    fn reload_token(&self) -> ReloadToken {
        self.reload.token()
    }
}

struct StaticSource(Arc<StaticProvider>);

impl ConfigurationSource for StaticSource {
    fn build(&self) -> Arc<dyn ConfigurationProvider> {
        Arc::clone(&self.0) as Arc<dyn ConfigurationProvider>
    }
}

#[derive(Default)]
pub struct TestConfigurationBuilder {
    sources: Vec<Box<dyn ConfigurationSource>>,
}

impl ConfigurationBuilder for TestConfigurationBuilder {
    fn add_source(&mut self, source: Box<dyn ConfigurationSource>) {
        self.sources.push(source);
    }
}

impl TestConfigurationBuilder {
    pub fn add_static<I, K, V>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.add_source(Box::new(StaticSource(Arc::new(StaticProvider::new(
            entries,
        )))));
        self
    }

    pub fn build(&self) -> ConfigurationRoot {
        let providers: Vec<Arc<dyn ConfigurationProvider>> =
            self.sources.iter().map(|source| source.build()).collect();
        let reload = Arc::new(ReloadSignal::new());
        for provider in &providers {
            forward_reload(Arc::downgrade(provider), Arc::downgrade(&reload));
        }
        ConfigurationRoot { providers, reload }
    }
}

/// 把层的一次性令牌转发到根信号，并在每次触发后重新订阅新令牌。
fn forward_reload(provider: Weak<dyn ConfigurationProvider>, root: Weak<ReloadSignal>) {
    let Some(layer) = provider.upgrade() else {
        return;
    };
    layer.reload_token().register(move || {
        if let Some(signal) = root.upgrade() {
            signal.notify();
            forward_reload(provider, root);
        }
    });
}

pub struct ConfigurationRoot {
    providers: Vec<Arc<dyn ConfigurationProvider>>,
    reload: Arc<ReloadSignal>,
}

impl ConfigurationRoot {
    /// 索引读取：从最后添加的层向前查找，返回第一个命中的值。
    pub fn get(&self, key: &str) -> Option<String> {
        self.providers
            .iter()
            .rev()
            .find_map(|provider| provider.try_get(key))
            .and_then(|value| value.to_option_string())
    }

    /// 分节遍历：依次让每一层追加子段，再忽略大小写去重并拼成完整路径。
    pub fn children(&self, path: Option<&str>) -> Vec<String> {
        let mut segments = self
            .providers
            .iter()
            .fold(Vec::new(), |earlier, provider| provider.child_keys(earlier, path));
        segments.dedup_by(|later, earlier| eq_ignore_case(later, earlier));
        segments
            .into_iter()
            .map(|segment| match path.filter(|p| !p.is_empty()) {
                Some(parent) => key::combine([parent, segment.as_str()]),
                None => segment,
            })
            .collect()
    }

    pub fn reload_token(&self) -> ReloadToken {
        self.reload.token()
    }

    pub fn reload_epoch(&self) -> u64 {
        self.reload.epoch()
    }
}
