//! 层级展开器 - 编排层
//!
//! ## 职责
//!
//! 遍历文档树（工单 → 作业 → {工时, 配件}），为每个节点产生一行或一个占位记录。
//!
//! ## 失败隔离
//!
//! - 每个节点的提取互不依赖
//! - 作业提取失败不影响同一工单下的其他作业
//! - 工时提取失败不影响同一作业的配件，反之亦然
//! - 子节点的 job_id 始终取自遍历时的父作业

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::error::ExtractError;
use crate::models::record::{child_list, raw_id, RawDocument, JOBS_KEY, LABOR_KEY, PARTS_KEY};
use crate::models::tables::{
    Defaulted, JobChild, JobRow, LaborRow, NodeKind, NodeOutcome, PartRow, RepairOrderRow,
    JOB_FIELDS, LABOR_FIELDS, PART_FIELDS, REPAIR_ORDER_FIELDS,
};
use crate::services::field_extractor::extract_row;

/// 一批节点的提取结果（尚未组装）
#[derive(Debug, Default)]
pub struct FlattenedBatch {
    pub repair_orders: Vec<NodeOutcome<RepairOrderRow>>,
    pub jobs: Vec<NodeOutcome<JobRow>>,
    pub labor: Vec<NodeOutcome<LaborRow>>,
    pub parts: Vec<NodeOutcome<PartRow>>,
}

impl FlattenedBatch {
    /// 合并另一个工单的结果
    pub fn merge(&mut self, other: FlattenedBatch) {
        self.repair_orders.extend(other.repair_orders);
        self.jobs.extend(other.jobs);
        self.labor.extend(other.labor);
        self.parts.extend(other.parts);
    }

    /// 所有占位记录
    pub fn defaulted(&self) -> Vec<&Defaulted> {
        self.repair_orders
            .iter()
            .filter_map(NodeOutcome::defaulted)
            .chain(self.jobs.iter().filter_map(NodeOutcome::defaulted))
            .chain(self.labor.iter().filter_map(NodeOutcome::defaulted))
            .chain(self.parts.iter().filter_map(NodeOutcome::defaulted))
            .collect()
    }
}

/// 展开整个文档
pub fn flatten_document(document: &RawDocument) -> FlattenedBatch {
    let mut batch = FlattenedBatch::default();
    for node in document.repair_orders() {
        batch.merge(flatten_repair_order(node));
    }
    batch
}

/// 展开单个工单
pub fn flatten_repair_order(node: &Value) -> FlattenedBatch {
    let mut batch = FlattenedBatch::default();

    let outcome = extract_node::<RepairOrderRow>(node, REPAIR_ORDER_FIELDS, NodeKind::RepairOrder, None);
    let repair_order_id = match &outcome {
        NodeOutcome::Extracted(row) => row.id,
        NodeOutcome::Defaulted(d) => d.node_id,
    };
    batch.repair_orders.push(outcome);

    match child_list(node, JOBS_KEY) {
        Ok(jobs) => {
            for job_node in jobs {
                flatten_job(job_node, repair_order_id, &mut batch);
            }
        }
        Err(reason) => batch.jobs.push(defaulted(NodeKind::Job, reason, repair_order_id, None)),
    }

    batch
}

/// 展开单个作业及其工时、配件
fn flatten_job(node: &Value, repair_order_id: Option<i64>, batch: &mut FlattenedBatch) {
    let outcome = extract_node::<JobRow>(node, JOB_FIELDS, NodeKind::Job, repair_order_id);
    let job_id = match &outcome {
        NodeOutcome::Extracted(row) => row.id,
        NodeOutcome::Defaulted(d) => d.node_id,
    };
    batch.jobs.push(outcome);

    batch
        .labor
        .extend(flatten_children::<LaborRow>(node, job_id, LABOR_KEY, LABOR_FIELDS, NodeKind::Labor));
    batch
        .parts
        .extend(flatten_children::<PartRow>(node, job_id, PARTS_KEY, PART_FIELDS, NodeKind::Part));
}

/// 展开作业下的一个子列表
///
/// 列表缺失时记录一个占位；列表中每个元素独立提取
fn flatten_children<T>(
    job_node: &Value,
    job_id: Option<i64>,
    key: &str,
    fields: &[&str],
    kind: NodeKind,
) -> Vec<NodeOutcome<T>>
where
    T: DeserializeOwned + JobChild,
{
    let entries = match child_list(job_node, key) {
        Ok(entries) => entries,
        Err(reason) => return vec![defaulted(kind, reason, job_id, None)],
    };

    entries
        .iter()
        .map(|entry| match extract_node::<T>(entry, fields, kind, job_id) {
            NodeOutcome::Extracted(mut row) => {
                row.set_job_id(job_id);
                NodeOutcome::Extracted(row)
            }
            other => other,
        })
        .collect()
}

fn extract_node<T: DeserializeOwned>(
    node: &Value,
    fields: &[&str],
    kind: NodeKind,
    parent_id: Option<i64>,
) -> NodeOutcome<T> {
    match extract_row::<T>(node, fields) {
        Ok(row) => NodeOutcome::Extracted(row),
        Err(reason) => defaulted(kind, reason, parent_id, raw_id(node)),
    }
}

fn defaulted<T>(
    kind: NodeKind,
    reason: ExtractError,
    parent_id: Option<i64>,
    node_id: Option<i64>,
) -> NodeOutcome<T> {
    let record = Defaulted {
        kind,
        reason,
        parent_id,
        node_id,
    };
    warn!("⚠️ {}", record);
    NodeOutcome::Defaulted(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job(id: i64, repair_order_id: i64) -> Value {
        json!({
            "id": id, "repairOrderId": repair_order_id, "vehicleId": 3, "customerId": 4,
            "name": "Brakes", "note": null, "jobCategoryName": "Repair",
            "createdDate": "2024-01-01", "completedDate": null, "updatedDate": null,
            "labor": [{ "id": id * 10, "name": "Replace pads", "rate": 100, "hours": 1.0, "complete": true, "technicianId": 5 }],
            "parts": [{ "id": id * 100, "quantity": 1, "brand": "Bosch", "name": "Pad set", "partNumber": "BP-1" }]
        })
    }

    fn repair_order(id: i64, jobs: Vec<Value>) -> Value {
        json!({
            "id": id, "repairOrderNumber": 1001, "shopId": 1, "vehicleId": 3, "customerId": 4,
            "milesIn": 1000, "milesOut": 1001, "completedDate": "2024-01-02", "postedDate": null,
            "jobs": jobs
        })
    }

    #[test]
    fn test_flatten_complete_repair_order() {
        let batch = flatten_repair_order(&repair_order(1, vec![job(11, 1), job(12, 1)]));

        assert_eq!(batch.repair_orders.len(), 1);
        assert_eq!(batch.jobs.len(), 2);
        assert_eq!(batch.labor.len(), 2);
        assert_eq!(batch.parts.len(), 2);
        assert!(batch.defaulted().is_empty());

        let labor = batch.labor[0].extracted().unwrap();
        assert_eq!(labor.job_id, Some(11));
        let part = batch.parts[1].extracted().unwrap();
        assert_eq!(part.job_id, Some(12));
        assert_eq!(part.part_number.as_deref(), Some("BP-1"));
    }

    #[test]
    fn test_job_failure_does_not_affect_siblings() {
        let mut broken = job(11, 1);
        broken.as_object_mut().unwrap().remove("note");

        let batch = flatten_repair_order(&repair_order(1, vec![broken, job(12, 1)]));

        assert_eq!(batch.jobs.len(), 2);
        let d = batch.jobs[0].defaulted().unwrap();
        assert_eq!(d.parent_id, Some(1));
        assert_eq!(d.node_id, Some(11));
        assert_eq!(d.reason, ExtractError::missing("note"));
        assert!(batch.jobs[1].extracted().is_some());

        // 作业本身失败，子节点仍然挂在原始 id 下
        assert_eq!(batch.labor[0].extracted().unwrap().job_id, Some(11));
    }

    #[test]
    fn test_labor_failure_does_not_suppress_parts() {
        let mut node = job(11, 1);
        node.as_object_mut().unwrap().remove("labor");

        let batch = flatten_repair_order(&repair_order(1, vec![node]));

        assert_eq!(batch.labor.len(), 1);
        let d = batch.labor[0].defaulted().unwrap();
        assert_eq!(d.kind, NodeKind::Labor);
        assert_eq!(d.parent_id, Some(11));
        assert!(batch.parts[0].extracted().is_some());
    }

    #[test]
    fn test_each_part_is_extracted_independently() {
        let mut node = job(11, 1);
        node["parts"] = json!([
            { "id": 1, "quantity": 1, "brand": "Bosch", "name": "Pad set" },
            { "id": 2, "quantity": 2, "brand": null, "name": "Rotor", "partNumber": null }
        ]);

        let batch = flatten_repair_order(&repair_order(1, vec![node]));
        assert!(batch.parts[0].defaulted().is_some());
        assert_eq!(batch.parts[1].extracted().unwrap().id, Some(2));
    }

    #[test]
    fn test_repair_order_without_jobs_list() {
        let mut node = repair_order(1, vec![]);
        node.as_object_mut().unwrap().remove("jobs");

        let batch = flatten_repair_order(&node);
        assert!(batch.repair_orders[0].extracted().is_some());
        assert_eq!(batch.jobs.len(), 1);
        assert_eq!(batch.jobs[0].defaulted().unwrap().parent_id, Some(1));
    }

    #[test]
    fn test_flatten_document_merges_orders() {
        let doc = RawDocument::from_value(json!({
            "content": [repair_order(1, vec![job(11, 1)]), repair_order(2, vec![job(21, 2)])]
        }))
        .unwrap();

        let batch = flatten_document(&doc);
        assert_eq!(batch.repair_orders.len(), 2);
        assert_eq!(batch.jobs.len(), 2);
        assert_eq!(batch.labor.len(), 2);
    }
}
