//! 原始导出文档
//!
//! 文档结构：`content` → 工单 → `jobs` → 作业 → {`labor`, `parts`}
//! 节点保持为 `serde_json::Value`，字段是否齐全由提取阶段判断

use crate::error::{ExtractError, InputError};
use serde_json::Value;

/// 工单下的作业列表键
pub const JOBS_KEY: &str = "jobs";
/// 作业下的工时列表键
pub const LABOR_KEY: &str = "labor";
/// 作业下的配件列表键
pub const PARTS_KEY: &str = "parts";

/// 一次运行读取的完整文档
#[derive(Debug, Clone)]
pub struct RawDocument {
    repair_orders: Vec<Value>,
}

impl RawDocument {
    /// 从 JSON 值构建，要求顶层包含 `content` 数组
    pub fn from_value(value: Value) -> Result<Self, InputError> {
        match value {
            Value::Object(mut map) => match map.remove("content") {
                Some(Value::Array(repair_orders)) => Ok(Self { repair_orders }),
                _ => Err(InputError::MissingContent),
            },
            _ => Err(InputError::MissingContent),
        }
    }

    /// 所有工单节点
    pub fn repair_orders(&self) -> &[Value] {
        &self.repair_orders
    }

    pub fn len(&self) -> usize {
        self.repair_orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repair_orders.is_empty()
    }
}

/// 读取节点自身的 `id`（仅用于诊断和外键回填）
pub fn raw_id(node: &Value) -> Option<i64> {
    node.get("id").and_then(Value::as_i64)
}

/// 读取节点下的子列表
///
/// 键缺失、值为 null 或不是数组时返回 `MissingList`
pub fn child_list<'a>(node: &'a Value, key: &str) -> Result<&'a [Value], ExtractError> {
    node.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| ExtractError::MissingList {
            key: key.to_string(),
        })
}
