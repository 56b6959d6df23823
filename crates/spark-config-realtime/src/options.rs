use crate::error::RealtimeConfigError;

/// `strict()` 采用的默认键长上限（字节）。
pub const STRICT_MAX_KEY_LENGTH: usize = 1024;

/// 存储的键准入策略。
///
/// # 教案式说明
/// - **意图 (Why)**：存储本身把键视为不透明标识，默认不拒绝任何输入（包括空串）；
///   若宿主管线有更严格的约束，可在此声明，让非法键在写入时快速失败，而非在下游绑定阶段才暴露。
/// - **契约 (What)**：
///   - `Default` 为宽松策略：接受空键、不限长度、允许控制字符；
///   - [`strict`](Self::strict) 开启全部检查；
///   - 策略只作用于 `set`；`try_get`/`remove` 对不可能被写入的键直接返回“未找到”。
/// - **执行 (How)**：构造后不可变，由 [`RealtimeStore`](crate::RealtimeStore) 持有。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreOptions {
    allow_empty_key: bool,
    max_key_length: Option<usize>,
    reject_control_characters: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            allow_empty_key: true,
            max_key_length: None,
            reject_control_characters: false,
        }
    }
}

impl StoreOptions {
    /// 宽松策略，等价于 `Default`。
    pub fn new() -> Self {
        Self::default()
    }

    /// 严格策略：拒绝空键与控制字符，并限制键长。
    pub fn strict() -> Self {
        Self {
            allow_empty_key: false,
            max_key_length: Some(STRICT_MAX_KEY_LENGTH),
            reject_control_characters: true,
        }
    }

    #[must_use]
    pub fn with_allow_empty_key(mut self, allow: bool) -> Self {
        self.allow_empty_key = allow;
        self
    }

    #[must_use]
    pub fn with_max_key_length(mut self, limit: Option<usize>) -> Self {
        self.max_key_length = limit;
        self
    }

    #[must_use]
    pub fn with_reject_control_characters(mut self, reject: bool) -> Self {
        self.reject_control_characters = reject;
        self
    }

    pub fn allow_empty_key(&self) -> bool {
        self.allow_empty_key
    }

    pub fn max_key_length(&self) -> Option<usize> {
        self.max_key_length
    }

    pub fn reject_control_characters(&self) -> bool {
        self.reject_control_characters
    }

    /// 按策略校验键。
    pub fn validate_key(&self, key: &str) -> Result<(), RealtimeConfigError> {
        if key.is_empty() {
            return if self.allow_empty_key {
                Ok(())
            } else {
                Err(RealtimeConfigError::EmptyKey)
            };
        }

        if let Some(limit) = self.max_key_length
            && key.len() > limit
        {
            return Err(RealtimeConfigError::KeyTooLong {
                key: key.to_owned(),
                len: key.len(),
                limit,
            });
        }

        if self.reject_control_characters && key.chars().any(char::is_control) {
            return Err(RealtimeConfigError::ControlCharacter {
                key: key.to_owned(),
            });
        }

        Ok(())
    }

    /// 键是否可能已被写入；用于读路径的短路判断。
    pub(crate) fn admits(&self, key: &str) -> bool {
        self.validate_key(key).is_ok()
    }
}
