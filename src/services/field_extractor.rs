//! 字段提取 - 业务能力层
//!
//! 只负责“从单个节点取出声明的字段”，不关心节点在文档中的位置

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::OnceLock;

use crate::error::ExtractError;

fn uppercase_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Z]").expect("静态正则表达式合法"))
}

/// 列名规范化
///
/// 在每个非首位的大写字母前插入下划线，然后整体转小写，
/// 例如 `repairOrderId` → `repair_order_id`
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut last = 0;

    for m in uppercase_re().find_iter(name) {
        out.push_str(&name[last..m.start()]);
        if m.start() > 0 {
            out.push('_');
        }
        out.push_str(m.as_str());
        last = m.end();
    }
    out.push_str(&name[last..]);

    out.to_lowercase()
}

/// 提取声明的字段
///
/// 全部字段都存在才返回；任意一个缺失即整体失败（值为 null 视为存在）
///
/// # 返回
/// 以规范化列名为键的字段表
pub fn extract_fields(node: &Value, fields: &[&str]) -> Result<Map<String, Value>, ExtractError> {
    let object = node.as_object().ok_or(ExtractError::NotAnObject)?;

    let mut row = Map::with_capacity(fields.len());
    for field in fields {
        let value = object.get(*field).ok_or_else(|| ExtractError::missing(*field))?;
        row.insert(normalize_name(field), value.clone());
    }

    Ok(row)
}

/// 提取字段并构建类型化的行
///
/// 普通列按宽松规则转换；主键或工单外键类型不对（例如字符串 id）视为提取失败
pub fn extract_row<T: DeserializeOwned>(node: &Value, fields: &[&str]) -> Result<T, ExtractError> {
    let row = extract_fields(node, fields)?;
    serde_json::from_value(Value::Object(row)).map_err(|e| ExtractError::TypeMismatch {
        message: e.to_string(),
    })
}
