//! 语言选择
//!
//! - `resolve_locale`: 从 Accept-Language 中取首选语言
//! - `LocalePolicy::select_name`: 按回退链从名称表中挑选显示名称
//!
//! 回退顺序：请求语言 → 默认语言 → 英文 → 空字符串

use std::collections::BTreeMap;

/// locale → 显示名称
pub type NameMapping = BTreeMap<String, String>;

/// 名称回退链的最后一级
pub const FALLBACK_LOCALE: &str = "en";

/// 解析 Accept-Language，返回首选语言标签（忽略权重）
///
/// 输入缺失、为空或首项为空时返回 `default`。
pub fn resolve_locale(header: Option<&str>, default: &str) -> String {
    let Some(header) = header.map(str::trim).filter(|h| !h.is_empty()) else {
        return default.to_string();
    };

    let first = header.split(',').next().unwrap_or_default();
    let tag = first.split(';').next().unwrap_or_default().trim();

    if tag.is_empty() {
        default.to_string()
    } else {
        tag.to_string()
    }
}

/// 显示名称选择策略
#[derive(Debug, Clone)]
pub struct LocalePolicy {
    default_locale: String,
}

impl LocalePolicy {
    pub fn new(default_locale: impl Into<String>) -> Self {
        Self {
            default_locale: default_locale.into(),
        }
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// 从 Accept-Language 解析目标语言
    pub fn resolve(&self, header: Option<&str>) -> String {
        resolve_locale(header, &self.default_locale)
    }

    /// 同语系的标签统一改写为默认语言标签
    ///
    /// 数据库对每个语系只存一个组合标签，例如 `zh`、`zh-TW` 都只能命中 `zh-CN`。
    pub fn normalize<'a>(&'a self, target: &'a str) -> &'a str {
        match (language_root(target), language_root(&self.default_locale)) {
            (Some(t), Some(d)) if t.eq_ignore_ascii_case(d) => self.default_locale.as_str(),
            _ => target,
        }
    }

    /// 按 目标语言 → 默认语言 → 英文 的顺序返回第一个非空名称
    pub fn select_name(&self, names: Option<&NameMapping>, target: &str) -> String {
        let Some(names) = names else {
            return String::new();
        };

        [
            self.normalize(target),
            self.default_locale.as_str(),
            FALLBACK_LOCALE,
        ]
        .into_iter()
        .filter_map(|locale| names.get(locale))
        .find(|name| !name.is_empty())
        .cloned()
        .unwrap_or_default()
    }
}

impl Default for LocalePolicy {
    fn default() -> Self {
        Self::new("zh-CN")
    }
}

/// 取两字母语言根，例如 `zh-CN` → `zh`
fn language_root(tag: &str) -> Option<&str> {
    tag.get(..2).filter(|root| root.chars().all(|c| c.is_ascii_alphabetic()))
}
