use std::{fmt, sync::Arc};

/// 配置项的取值：一个可选字符串。
///
/// ### 设计目标（Why）
/// - 宿主配置管线允许键存在但值为“空”（null 占位），这与“键不存在”是两种不同的可观测状态；
/// - 存储层只负责原样保存调用方写入的内容，不对空串做特殊处理。
///
/// ### 契约说明（What）
/// - [`ConfigValue::null`] 表示 null 占位；`ConfigValue::from("")` 是一个真实的空串，二者不相等；
/// - 相等性是逐字节（ordinal）比较，`Set` 的“值未变即不通知”语义依赖于此；
/// - 克隆只增加 `Arc` 引用计数，适合在读路径上频繁返回。
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ConfigValue(Option<Arc<str>>);

impl ConfigValue {
    /// null 占位值。
    #[inline]
    pub const fn null() -> Self {
        Self(None)
    }

    /// 由字符串构造。
    pub fn new<V>(value: V) -> Self
    where
        V: Into<Arc<str>>,
    {
        Self(Some(value.into()))
    }

    /// 是否为 null 占位。
    #[inline]
    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    /// 以 `Option<&str>` 形式借出。
    #[inline]
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// 拷贝为拥有型字符串。
    pub fn to_option_string(&self) -> Option<String> {
        self.0.as_deref().map(str::to_owned)
    }
}

impl fmt::Debug for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(value) => fmt::Debug::fmt(&**value, f),
            None => f.write_str("null"),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_deref().unwrap_or(""))
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<Arc<str>> for ConfigValue {
    fn from(value: Arc<str>) -> Self {
        Self(Some(value))
    }
}

impl<T> From<Option<T>> for ConfigValue
where
    T: Into<Arc<str>>,
{
    fn from(value: Option<T>) -> Self {
        Self(value.map(Into::into))
    }
}

impl PartialEq<str> for ConfigValue {
    fn eq(&self, other: &str) -> bool {
        self.as_deref() == Some(other)
    }
}

impl PartialEq<&str> for ConfigValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_deref() == Some(*other)
    }
}
