//! 宽松字段转换
//!
//! 非主键列在字段存在时总能构建行：类型可转换则转换，否则为 `None`。
//! 主键和工单外键不使用这些函数，类型不对仍视为提取失败。

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// 字符串列：数字、布尔值转为文本
pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// 数值列：数字或可解析的字符串
pub fn float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// 整数列：整数、无小数部分的浮点数或可解析的字符串
pub fn integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// 布尔列：`0`/`1` 和 `"true"`/`"false"` 也接受
pub fn boolean<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => Some(b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "string")]
        text: Option<String>,
        #[serde(deserialize_with = "float")]
        amount: Option<f64>,
        #[serde(deserialize_with = "integer")]
        count: Option<i64>,
        #[serde(deserialize_with = "boolean")]
        flag: Option<bool>,
    }

    fn convert(value: Value) -> Sample {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_convertible_values() {
        let row = convert(json!({ "text": 12345, "amount": "1.5", "count": "RO-5001", "flag": 1 }));
        assert_eq!(row.text.as_deref(), Some("12345"));
        assert_eq!(row.amount, Some(1.5));
        assert_eq!(row.count, None);
        assert_eq!(row.flag, Some(true));
    }

    #[test]
    fn test_non_convertible_values_become_none() {
        let row = convert(json!({ "text": [1], "amount": {}, "count": 2.5, "flag": "maybe" }));
        assert_eq!(row.text, None);
        assert_eq!(row.amount, None);
        assert_eq!(row.count, None);
        assert_eq!(row.flag, None);

        let row = convert(json!({ "text": null, "amount": null, "count": 7.0, "flag": "FALSE" }));
        assert_eq!(row.text, None);
        assert_eq!(row.amount, None);
        assert_eq!(row.count, Some(7));
        assert_eq!(row.flag, Some(false));
    }
}
