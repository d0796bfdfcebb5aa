//! 松散 JSON 的读取工具
//!
//! 负载多由 XML 转换而来：属性可能带 `@` 前缀，重复元素可能塌缩成单个对象，
//! 空元素可能是 `""`，数值常以字符串给出。这里的函数把这些差异统一掉。

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::core::FetchError;

pub const UNKNOWN_COURSE: &str = "Unknown Course";
pub const UNKNOWN_TEACHER: &str = "Unknown Teacher";
pub const UNTITLED: &str = "Untitled";

fn ratio_re() -> &'static Regex {
    static RATIO_RE: OnceLock<Regex> = OnceLock::new();
    RATIO_RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*(-?\d+(?:\.\d+)?)\s*(?:/|out of)\s*(-?\d+(?:\.\d+)?)\s*$")
            .expect("valid ratio regex")
    })
}

/// 读取对象字段：先查 `key`，再查 XML 属性形式 `@key`；null 视为缺失
pub fn field<'a>(obj: &'a Value, key: &str) -> Option<&'a Value> {
    let map = obj.as_object()?;
    map.get(key)
        .or_else(|| map.get(&format!("@{}", key)))
        .filter(|v| !v.is_null())
}

/// 逐层读取嵌套字段，任一层缺失或不是对象则返回 None
pub fn path<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().try_fold(obj, |cur, key| field(cur, key))
}

/// 标量转文本；空白字符串视为缺失
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// 按顺序尝试候选键，取第一个非空文本
pub fn pick_text(obj: &Value, chain: &[&str]) -> Option<String> {
    chain.iter().find_map(|key| field(obj, key).and_then(text))
}

pub fn text_or(obj: &Value, chain: &[&str], default: &str) -> String {
    pick_text(obj, chain).unwrap_or_else(|| default.to_string())
}

/// 数值解析：接受数字与数字字符串（容忍首尾空白和结尾的 %）；失败或非有限值为 0
pub fn parse_float(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite()).unwrap_or(0.0)
}

/// 取候选键中第一个存在的值再解析
pub fn pick_float(obj: &Value, chain: &[&str]) -> f64 {
    parse_float(chain.iter().find_map(|key| field(obj, key)))
}

/// 解析 "8 / 10"、"8 out of 10" 形式的得分
pub fn parse_ratio(s: &str) -> Option<(f64, f64)> {
    let caps = ratio_re().captures(s)?;
    let score = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let max = caps.get(2)?.as_str().parse::<f64>().ok()?;
    Some((score, max))
}

/// 重复元素：缺失 / null / "" 为空列表，对象为单元素列表，数组原样；其它标量无法恢复
pub fn collection<'a>(value: Option<&'a Value>, what: &str) -> Result<Vec<&'a Value>, FetchError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.iter().collect()),
        Some(obj @ Value::Object(_)) => Ok(vec![obj]),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(Vec::new()),
        Some(other) => Err(FetchError::Normalization(format!(
            "{} should be a list or object, found {}",
            what,
            kind_of(other)
        ))),
    }
}

/// 第一个元素（单对象即其本身）
pub fn first<'a>(value: Option<&'a Value>, what: &str) -> Result<Option<&'a Value>, FetchError> {
    Ok(collection(value, what)?.into_iter().next())
}

/// 顶层负载：null 为结构缺失（None），对象正常返回，其它类型无法恢复
pub fn root_object<'a>(payload: &'a Value, what: &str) -> Result<Option<&'a Value>, FetchError> {
    match payload {
        Value::Null => Ok(None),
        Value::Object(_) => Ok(Some(payload)),
        other => Err(FetchError::Normalization(format!(
            "{} payload should be an object, found {}",
            what,
            kind_of(other)
        ))),
    }
}

/// 列表元素必须是对象
pub fn expect_object<'a>(value: &'a Value, what: &str) -> Result<&'a Value, FetchError> {
    if value.is_object() {
        Ok(value)
    } else {
        Err(FetchError::Normalization(format!(
            "{} entry should be an object, found {}",
            what,
            kind_of(value)
        )))
    }
}

pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
