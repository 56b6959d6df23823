//! 配置键：大小写不敏感的身份与层级路径工具。
//!
//! # 教案式说明
//! - **意图 (Why)**：宿主配置管线约定 `section:subsection:key` 形式的路径，且键的身份忽略大小写；
//!   把这些规则集中在一个模块，存储与层级枚举共享同一套比较语义，避免两处实现悄悄分叉。
//! - **契约 (What)**：
//!   - [`KEY_DELIMITER`] 是唯一保留的分隔符；
//!   - [`ConfigKey`] 的 `Eq`/`Hash`/`Ord` 全部基于 [`fold_case`] 后的字符序列，三者相互一致；
//!   - [`combine`] 不做大小写转换，只以分隔符拼接。
//! - **实现 (How)**：逐字符调用 `char::to_lowercase` 展开成折叠序列，再交由迭代器的 `eq`/`cmp` 完成比较，
//!   全程不分配新字符串。

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

/// 层级路径的分隔符。
pub const KEY_DELIMITER: char = ':';

/// 返回字符串的大小写折叠字符序列。
#[inline]
pub fn fold_case(value: &str) -> impl Iterator<Item = char> + '_ {
    value.chars().flat_map(char::to_lowercase)
}

/// 忽略大小写判断两个字符串是否相等。
#[inline]
pub fn eq_ignore_case(left: &str, right: &str) -> bool {
    if left.is_ascii() && right.is_ascii() {
        return left.eq_ignore_ascii_case(right);
    }
    fold_case(left).eq(fold_case(right))
}

/// 忽略大小写的字典序比较。
///
/// 按折叠后的码点逐个比较；相等意味着两者仅大小写不同。
#[inline]
pub fn compare_ignore_case(left: &str, right: &str) -> Ordering {
    fold_case(left).cmp(fold_case(right))
}

/// 全序比较：先忽略大小写，再以原始码点顺序打破平局。
///
/// 层级枚举依赖它产生与 map 遍历顺序无关的稳定结果。
///
/// 注意：忽略大小写的部分按小写折叠比较。码点位于大写与小写字母之间的
/// ``[ \ ] ^ _ ` `` 因此排在字母之前（`"a_b" < "ab"`）；按大写折叠的约定（如 .NET 的
/// `OrdinalIgnoreCase`）会把它们排在字母之后，两者的枚举顺序在这些字符上不同。
#[inline]
pub fn compare_total(left: &str, right: &str) -> Ordering {
    compare_ignore_case(left, right).then_with(|| left.cmp(right))
}

/// 若 `key` 以 `prefix` 开头（按折叠序列忽略大小写），返回剩余部分。
///
/// # 教案式说明
/// - **意图 (Why)**：层级枚举需要知道“前缀之后的第一个字符”，因此必须在原始字符串上定位字节边界，
///   不能先整体转小写再切片（折叠可能改变字节长度）。
/// - **契约 (What)**：
///   - 与 [`ConfigKey`] 的相等性一致：`fold_case(prefix)` 必须恰好是 `key` 某个字符边界之前部分的折叠序列；
///   - 一个字符折叠成多个码点时（如 `'\u{130}'` 折叠为 `i` + `'\u{307}'`），前缀不得只覆盖其中一部分；
///   - 返回的切片总是 `key` 的后缀；`prefix` 为空时返回整个 `key`。
/// - **实现 (How)**：逐字符展开 `key` 的折叠序列，与 `prefix` 的折叠序列同步推进，
///   记录前缀耗尽时所在的原始字节下标。
pub fn strip_prefix_ignore_case<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    let mut expected = fold_case(prefix).peekable();
    for (index, actual) in key.char_indices() {
        if expected.peek().is_none() {
            return Some(&key[index..]);
        }
        for folded in actual.to_lowercase() {
            if expected.next() != Some(folded) {
                return None;
            }
        }
    }
    expected.peek().is_none().then_some("")
}

/// 以 [`KEY_DELIMITER`] 拼接路径片段。
pub fn combine<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut path = String::new();
    for (index, segment) in segments.into_iter().enumerate() {
        if index > 0 {
            path.push(KEY_DELIMITER);
        }
        path.push_str(segment.as_ref());
    }
    path
}

/// 配置项的完整键。
///
/// # 教案式说明
/// - **意图 (Why)**：并发 map 需要一个“忽略大小写”的哈希键；同时要保留调用方首次写入时的原始拼写，
///   供层级枚举原样返回。
/// - **契约 (What)**：
///   - `ConfigKey::new("A:B") == ConfigKey::new("a:b")`，且二者哈希相同；
///   - [`as_str`](Self::as_str) 返回构造时的原始字符串；
///   - 克隆只增加 `Arc` 引用计数。
/// - **权衡 (Trade-offs)**：点查时需要为查询键构造一次 `Arc<str>`；换来的是 `dashmap` 的
///   `Borrow` 约束下无需 `unsafe` 的大小写不敏感查找。
#[derive(Clone)]
pub struct ConfigKey {
    raw: Arc<str>,
}

impl ConfigKey {
    /// 由任意字符串构造键。
    pub fn new<K>(raw: K) -> Self
    where
        K: Into<Arc<str>>,
    {
        Self { raw: raw.into() }
    }

    /// 原始拼写。
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl PartialEq for ConfigKey {
    fn eq(&self, other: &Self) -> bool {
        eq_ignore_case(&self.raw, &other.raw)
    }
}

impl Eq for ConfigKey {}

impl Hash for ConfigKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for ch in fold_case(&self.raw) {
            state.write_u32(ch as u32);
        }
        // 终止符，避免前缀冲突。
        state.write_u8(0xff);
    }
}

impl PartialOrd for ConfigKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ConfigKey {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_ignore_case(&self.raw, &other.raw)
    }
}

impl fmt::Debug for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.raw, f)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for ConfigKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ConfigKey {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for ConfigKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(key: &ConfigKey) -> u64 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn keys_differing_only_in_case_are_equal_and_hash_alike() {
        let upper = ConfigKey::new("Database:Host");
        let lower = ConfigKey::new("database:HOST");
        assert_eq!(upper, lower);
        assert_eq!(hash_of(&upper), hash_of(&lower));
        assert_eq!(upper.as_str(), "Database:Host", "原始拼写必须保留");
    }

    #[test]
    fn non_ascii_keys_fold_consistently() {
        let a = ConfigKey::new("Ärger:Ω");
        let b = ConfigKey::new("ärger:ω");
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn strip_prefix_respects_char_boundaries() {
        assert_eq!(strip_prefix_ignore_case("DB:host", "db"), Some(":host"));
        assert_eq!(strip_prefix_ignore_case("db", "db"), Some(""));
        assert_eq!(strip_prefix_ignore_case("d", "db"), None);
        assert_eq!(strip_prefix_ignore_case("Ärger:x", "ärger"), Some(":x"));
        assert_eq!(strip_prefix_ignore_case("anything", ""), Some("anything"));
    }

    #[test]
    fn total_order_breaks_case_ties_ordinally() {
        assert_eq!(compare_ignore_case("ABC", "abc"), Ordering::Equal);
        assert_eq!(compare_total("ABC", "abc"), Ordering::Less);
        assert_eq!(compare_total("b", "A"), Ordering::Greater);
    }

    #[test]
    fn lowercase_folding_orders_punctuation_before_letters() {
        assert_eq!(compare_total("a_b", "ab"), Ordering::Less);
        assert_eq!(compare_total("A_B", "ab"), Ordering::Less);
    }

    #[test]
    fn strip_prefix_follows_multi_char_folding() {
        // '\u{130}' 折叠为 "i\u{307}"，与键相等性保持一致。
        assert_eq!(ConfigKey::new("\u{130}"), ConfigKey::new("i\u{307}"));
        assert_eq!(strip_prefix_ignore_case("\u{130}:x", "i\u{307}"), Some(":x"));
        assert_eq!(strip_prefix_ignore_case("i\u{307}:y", "\u{130}"), Some(":y"));
        assert_eq!(strip_prefix_ignore_case("\u{130}:x", "i"), None, "前缀不得切开单个字符的折叠序列");
        assert_eq!(strip_prefix_ignore_case("\u{130}", "\u{130}x"), None);
    }

    #[test]
    fn combine_joins_on_delimiter() {
        assert_eq!(combine(["a", "b", "c"]), "a:b:c");
        assert_eq!(combine(Vec::<&str>::new()), "");
    }
}
