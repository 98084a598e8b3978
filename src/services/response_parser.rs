//! 响应解析 - 业务能力层
//!
//! 把分类服务返回的列表字面量拆成标签，每个标签展开为一行，
//! 再关联回工单属性并按 (repair_order_id, 标签) 去重

use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::models::classification::{ClassificationOutcome, ClassifyStatus, ServiceLabel};
use crate::models::diagnostic::{Diagnostic, Stage};
use crate::models::tables::RepairOrderRow;

/// 解析列表字面量
///
/// 支持 `['Brake Fluid', "Inspection"]`、空列表和末尾逗号；
/// 其他任何形式都视为解析失败
pub fn parse_label_list(response: &str) -> Result<Vec<String>, ParseError> {
    let trimmed = response.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| ParseError::NotAList {
            response: response.to_string(),
        })?;

    // inner 在 response 中的字符偏移：前导空白 + '['
    let offset = response.chars().take_while(|c| c.is_whitespace()).count() + 1;
    let chars: Vec<char> = inner.chars().collect();
    let mut labels = Vec::new();
    let mut pos = 0;

    loop {
        skip_whitespace(&chars, &mut pos);
        if pos >= chars.len() {
            break;
        }

        let quote = chars[pos];
        if quote != '\'' && quote != '"' {
            return Err(ParseError::NonStringItem {
                position: offset + pos,
                response: response.to_string(),
            });
        }
        pos += 1;

        let mut label = String::new();
        let mut closed = false;
        while pos < chars.len() {
            let c = chars[pos];
            pos += 1;
            if c == '\\' && pos < chars.len() {
                push_escaped(&mut label, chars[pos]);
                pos += 1;
            } else if c == quote {
                closed = true;
                break;
            } else {
                label.push(c);
            }
        }
        if !closed {
            return Err(ParseError::UnterminatedString {
                response: response.to_string(),
            });
        }
        labels.push(label);

        skip_whitespace(&chars, &mut pos);
        if pos >= chars.len() {
            break;
        }
        if chars[pos] != ',' {
            return Err(ParseError::NotAList {
                response: response.to_string(),
            });
        }
        pos += 1;
    }

    Ok(labels)
}

/// 解码转义字符；未知转义保留反斜杠
fn push_escaped(label: &mut String, c: char) {
    match c {
        'n' => label.push('\n'),
        't' => label.push('\t'),
        'r' => label.push('\r'),
        '\\' | '\'' | '"' => label.push(c),
        other => {
            label.push('\\');
            label.push(other);
        }
    }
}

fn skip_whitespace(chars: &[char], pos: &mut usize) {
    while *pos < chars.len() && chars[*pos].is_whitespace() {
        *pos += 1;
    }
}

/// 解析结果汇总
#[derive(Debug, Default)]
pub struct ParseReport {
    /// 已去重的标签行
    pub labels: Vec<ServiceLabel>,
    /// 解析失败的作业数
    pub unparsable: usize,
    /// 因不在分类体系中而被丢弃的标签数
    pub off_taxonomy: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// 响应解析器
///
/// 职责：
/// - 解析单个作业的响应
/// - 把标签规范为分类体系中的写法
/// - 展开、关联工单属性、去重
pub struct ResponseParser {
    taxonomy: Vec<String>,
    strict: bool,
}

impl ResponseParser {
    pub fn new(taxonomy: Vec<String>, strict: bool) -> Self {
        Self { taxonomy, strict }
    }

    /// 规范化单个标签
    ///
    /// 精确匹配或忽略大小写匹配时返回分类体系中的写法；
    /// 非严格模式下保留原标签
    pub fn canonicalize(&self, label: &str) -> Option<String> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        if let Some(exact) = self.taxonomy.iter().find(|t| t.as_str() == label) {
            return Some(exact.clone());
        }
        if let Some(folded) = self
            .taxonomy
            .iter()
            .find(|t| t.eq_ignore_ascii_case(label))
        {
            return Some(folded.clone());
        }
        if self.strict {
            None
        } else {
            Some(label.to_string())
        }
    }

    /// 展开所有分类结果
    ///
    /// 只有 `Classified` 状态的结果参与解析；固定响应不产生标签行
    pub fn explode(
        &self,
        outcomes: &[ClassificationOutcome],
        repair_orders: &[RepairOrderRow],
    ) -> ParseReport {
        let orders: HashMap<i64, &RepairOrderRow> = repair_orders
            .iter()
            .filter_map(|ro| ro.id.map(|id| (id, ro)))
            .collect();

        let mut report = ParseReport::default();
        let mut seen: HashSet<(i64, String)> = HashSet::new();

        for outcome in outcomes {
            if outcome.status != ClassifyStatus::Classified {
                continue;
            }

            let labels = match parse_label_list(&outcome.response) {
                Ok(labels) => labels,
                Err(e) => {
                    warn!("[作业 {}] ⚠️ 无法解析分类响应: {}", outcome.job_id, e);
                    report.unparsable += 1;
                    report.diagnostics.push(Diagnostic::new(
                        Stage::Parse,
                        format!(
                            "作业 {} (工单 {}): {}",
                            outcome.job_id, outcome.repair_order_id, e
                        ),
                    ));
                    continue;
                }
            };

            let Some(order) = orders.get(&outcome.repair_order_id) else {
                warn!(
                    "[作业 {}] ⚠️ 找不到工单 {}",
                    outcome.job_id, outcome.repair_order_id
                );
                continue;
            };

            for raw in labels {
                let Some(label) = self.canonicalize(&raw) else {
                    debug!("[作业 {}] 丢弃分类体系之外的标签: {}", outcome.job_id, raw);
                    report.off_taxonomy += 1;
                    continue;
                };

                if !seen.insert((outcome.repair_order_id, label.clone())) {
                    continue;
                }

                report.labels.push(ServiceLabel {
                    repair_order_id: outcome.repair_order_id,
                    completed_date: order.completed_date.clone(),
                    miles_in: order.miles_in,
                    miles_out: order.miles_out,
                    customer_id: order.customer_id,
                    vehicle_id: order.vehicle_id,
                    service_response: label,
                });
            }
        }

        report
    }
}
