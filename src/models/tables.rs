//! 关系表的行类型
//!
//! 每种节点对应一张表：repair_orders / jobs / labor / parts

use crate::error::ExtractError;
use crate::models::lenient;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 工单需要的字段（源文档命名）
pub const REPAIR_ORDER_FIELDS: &[&str] = &[
    "id",
    "repairOrderNumber",
    "shopId",
    "vehicleId",
    "customerId",
    "milesIn",
    "milesOut",
    "completedDate",
    "postedDate",
];

/// 作业需要的字段
pub const JOB_FIELDS: &[&str] = &[
    "id",
    "repairOrderId",
    "vehicleId",
    "customerId",
    "name",
    "note",
    "jobCategoryName",
    "createdDate",
    "completedDate",
    "updatedDate",
];

/// 工时需要的字段
pub const LABOR_FIELDS: &[&str] = &["id", "name", "rate", "hours", "complete", "technicianId"];

/// 配件需要的字段
pub const PART_FIELDS: &[&str] = &["id", "quantity", "brand", "name", "partNumber"];

/// 带主键的行
pub trait Row {
    fn id(&self) -> Option<i64>;
}

/// 挂在作业下的行（工时、配件）
pub trait JobChild: Row {
    fn job_id(&self) -> Option<i64>;
    fn set_job_id(&mut self, job_id: Option<i64>);
    fn set_repair_order_id(&mut self, repair_order_id: Option<i64>);
}

/// 工单
///
/// 只有 `id` 要求整数，其他列按宽松规则转换
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepairOrderRow {
    pub id: Option<i64>,
    #[serde(deserialize_with = "lenient::integer")]
    pub repair_order_number: Option<i64>,
    #[serde(deserialize_with = "lenient::integer")]
    pub shop_id: Option<i64>,
    #[serde(deserialize_with = "lenient::integer")]
    pub vehicle_id: Option<i64>,
    #[serde(deserialize_with = "lenient::integer")]
    pub customer_id: Option<i64>,
    #[serde(deserialize_with = "lenient::float")]
    pub miles_in: Option<f64>,
    #[serde(deserialize_with = "lenient::float")]
    pub miles_out: Option<f64>,
    #[serde(deserialize_with = "lenient::string")]
    pub completed_date: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub posted_date: Option<String>,
}

/// 作业
///
/// `id` 和 `repair_order_id` 决定引用完整性，要求整数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRow {
    pub id: Option<i64>,
    pub repair_order_id: Option<i64>,
    #[serde(deserialize_with = "lenient::integer")]
    pub vehicle_id: Option<i64>,
    #[serde(deserialize_with = "lenient::integer")]
    pub customer_id: Option<i64>,
    #[serde(deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub note: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub job_category_name: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub created_date: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub completed_date: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub updated_date: Option<String>,
}

/// 工时
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaborRow {
    pub id: Option<i64>,
    #[serde(deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::float")]
    pub rate: Option<f64>,
    #[serde(deserialize_with = "lenient::float")]
    pub hours: Option<f64>,
    #[serde(deserialize_with = "lenient::boolean")]
    pub complete: Option<bool>,
    #[serde(deserialize_with = "lenient::integer")]
    pub technician_id: Option<i64>,
    #[serde(default)]
    pub job_id: Option<i64>,
    /// 组装阶段通过 job_id 重新关联
    #[serde(default)]
    pub repair_order_id: Option<i64>,
}

/// 配件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartRow {
    pub id: Option<i64>,
    #[serde(deserialize_with = "lenient::float")]
    pub quantity: Option<f64>,
    #[serde(deserialize_with = "lenient::string")]
    pub brand: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub part_number: Option<String>,
    #[serde(default)]
    pub job_id: Option<i64>,
    #[serde(default)]
    pub repair_order_id: Option<i64>,
}

impl Row for RepairOrderRow {
    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl Row for JobRow {
    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl Row for LaborRow {
    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl Row for PartRow {
    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl JobChild for LaborRow {
    fn job_id(&self) -> Option<i64> {
        self.job_id
    }

    fn set_job_id(&mut self, job_id: Option<i64>) {
        self.job_id = job_id;
    }

    fn set_repair_order_id(&mut self, repair_order_id: Option<i64>) {
        self.repair_order_id = repair_order_id;
    }
}

impl JobChild for PartRow {
    fn job_id(&self) -> Option<i64> {
        self.job_id
    }

    fn set_job_id(&mut self, job_id: Option<i64>) {
        self.job_id = job_id;
    }

    fn set_repair_order_id(&mut self, repair_order_id: Option<i64>) {
        self.repair_order_id = repair_order_id;
    }
}

/// 节点类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    RepairOrder,
    Job,
    Labor,
    Part,
}

impl NodeKind {
    /// 日志中显示的名称
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::RepairOrder => "工单",
            NodeKind::Job => "作业",
            NodeKind::Labor => "工时",
            NodeKind::Part => "配件",
        }
    }
}

/// 提取失败的占位记录
#[derive(Debug, Clone, PartialEq)]
pub struct Defaulted {
    pub kind: NodeKind,
    pub reason: ExtractError,
    /// 已知的父节点 id（工单节点没有父节点）
    pub parent_id: Option<i64>,
    /// 节点自身可读到的 id
    pub node_id: Option<i64>,
}

impl fmt::Display for Defaulted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}提取失败 (父节点: {}, 节点: {}): {}",
            self.kind.label(),
            fmt_id(self.parent_id),
            fmt_id(self.node_id),
            self.reason
        )
    }
}

/// 单个节点的提取结果
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOutcome<T> {
    /// 字段齐全，已构建行
    Extracted(T),
    /// 提取失败，只保留诊断信息
    Defaulted(Defaulted),
}

impl<T> NodeOutcome<T> {
    pub fn extracted(&self) -> Option<&T> {
        match self {
            NodeOutcome::Extracted(row) => Some(row),
            NodeOutcome::Defaulted(_) => None,
        }
    }

    pub fn defaulted(&self) -> Option<&Defaulted> {
        match self {
            NodeOutcome::Extracted(_) => None,
            NodeOutcome::Defaulted(d) => Some(d),
        }
    }
}

/// 组装后的四张表
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub repair_orders: Vec<RepairOrderRow>,
    pub jobs: Vec<JobRow>,
    pub labor: Vec<LaborRow>,
    pub parts: Vec<PartRow>,
}

fn fmt_id(id: Option<i64>) -> String {
    id.map(|v| v.to_string()).unwrap_or_else(|| "未知".to_string())
}
