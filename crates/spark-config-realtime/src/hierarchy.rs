//! 层级枚举：在给定父路径下重建一层子段。
//!
//! # 教案式说明
//! - **意图 (Why)**：宿主管线把配置绑定到结构化对象时，需要逐层遍历“某个路径下有哪些子节点”；
//!   存储只保存完整键，层级必须在每次查询时从当前键集合投影出来。
//! - **契约 (What)**：
//!   - 根（`None` 或空串）：结果为 `earlier_keys` 与全部完整键之并，不按分隔符切分；
//!   - 非根：仅保留“以父路径开头（忽略大小写）且紧随其后的字符恰为分隔符”的键，
//!     取分隔符之后到下一个分隔符（或结尾）之间的段，丢弃空段，忽略大小写去重；
//!   - 结果按 [`compare_total`] 排序：忽略大小写的码点序，平局按原始码点序，输出与输入遍历顺序无关。
//! - **实现 (How)**：纯函数，单次遍历键快照，复杂度 O(键数 + 结果数·log 结果数)；不缓存任何状态。
//! - **注意 (Gotchas)**：`earlier_keys` 原样并入，不与彼此去重；跨层去重由宿主负责。

use crate::key::{KEY_DELIMITER, compare_ignore_case, compare_total, strip_prefix_ignore_case};

/// 计算 `parent_path` 下的直接子段，并与上层已收集的段合并排序。
///
/// `keys` 应来自同一次快照，避免在多次遍历之间观测到撕裂的键集合。
pub fn child_keys<E, S, K, T>(earlier_keys: E, parent_path: Option<&str>, keys: K) -> Vec<String>
where
    E: IntoIterator<Item = S>,
    S: Into<String>,
    K: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut result: Vec<String> = earlier_keys.into_iter().map(Into::into).collect();

    match parent_path.filter(|path| !path.is_empty()) {
        None => {
            result.extend(keys.into_iter().map(|key| key.as_ref().to_owned()));
        }
        Some(parent) => {
            let mut children: Vec<String> = keys
                .into_iter()
                .filter_map(|key| immediate_child(key.as_ref(), parent).map(str::to_owned))
                .collect();
            children.sort_unstable_by(|a, b| compare_total(a, b));
            children.dedup_by(|later, earlier| compare_ignore_case(later, earlier).is_eq());
            result.extend(children);
        }
    }

    result.sort_by(|a, b| compare_total(a, b));
    result
}

/// 若 `key` 是 `parent` 的后代，返回紧随其后的那一段。
///
/// 与 `parent` 完全相同的键、仅共享字符前缀的键（`database` 之于 `data`）以及空段均返回 `None`。
pub fn immediate_child<'a>(key: &'a str, parent: &str) -> Option<&'a str> {
    // 前缀匹配走与 `ConfigKey` 相同的折叠序列，不比较字节长度。
    let rest = strip_prefix_ignore_case(key, parent)?;
    let rest = rest.strip_prefix(KEY_DELIMITER)?;
    let segment = match rest.find(KEY_DELIMITER) {
        Some(end) => &rest[..end],
        None => rest,
    };
    (!segment.is_empty()).then_some(segment)
}
