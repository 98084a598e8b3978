//! 表组装 - 编排层
//!
//! 把展开结果组装成四张满足引用完整性的表：
//!
//! 1. 丢弃 id 为空的行
//! 2. 丢弃工单 id 为空或工单不存在的作业
//! 3. 用作业 → 工单映射回填工时、配件的 repair_order_id，丢弃孤儿行
//! 4. 文本类字段的空值补为空串

use std::collections::HashMap;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::models::diagnostic::{Diagnostic, Stage};
use crate::models::tables::{JobChild, NodeOutcome, Row, Tables};
use crate::orchestrator::flattener::FlattenedBatch;

/// 单张表的组装统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    pub kept: usize,
    pub defaulted: usize,
    pub null_id: usize,
    pub orphaned: usize,
}

/// 组装统计与诊断
#[derive(Debug, Default)]
pub struct AssemblyReport {
    pub repair_orders: TableStats,
    pub jobs: TableStats,
    pub labor: TableStats,
    pub parts: TableStats,
    pub diagnostics: Vec<Diagnostic>,
}

impl AssemblyReport {
    /// 所有表中被占位的节点数
    pub fn total_defaulted(&self) -> usize {
        self.repair_orders.defaulted + self.jobs.defaulted + self.labor.defaulted + self.parts.defaulted
    }
}

/// 组装四张表
pub fn assemble(batch: FlattenedBatch) -> (Tables, AssemblyReport) {
    let mut report = AssemblyReport {
        diagnostics: batch
            .defaulted()
            .into_iter()
            .map(|d| Diagnostic::new(Stage::Extraction, d.to_string()))
            .collect(),
        ..Default::default()
    };

    let FlattenedBatch {
        repair_orders,
        jobs,
        labor,
        parts,
    } = batch;

    let repair_orders = keep_rows(repair_orders, &mut report.repair_orders);
    let known_orders: HashSet<i64> = repair_orders.iter().filter_map(Row::id).collect();

    let mut jobs = keep_rows(jobs, &mut report.jobs);
    jobs.retain(|job| match job.repair_order_id {
        Some(ro_id) if known_orders.contains(&ro_id) => true,
        other => {
            warn!("⚠️ 丢弃作业 {:?}: 工单 {:?} 不存在", job.id, other);
            report.jobs.orphaned += 1;
            false
        }
    });
    for job in &mut jobs {
        job.name.get_or_insert_with(String::new);
        job.note.get_or_insert_with(String::new);
        job.job_category_name.get_or_insert_with(String::new);
    }
    report.jobs.kept = jobs.len();

    let job_to_order: HashMap<i64, i64> = jobs
        .iter()
        .filter_map(|job| Some((job.id?, job.repair_order_id?)))
        .collect();

    let mut labor = rejoin_children(keep_rows(labor, &mut report.labor), &job_to_order, &mut report.labor);
    for row in &mut labor {
        row.name.get_or_insert_with(String::new);
    }

    let mut parts = rejoin_children(keep_rows(parts, &mut report.parts), &job_to_order, &mut report.parts);
    for row in &mut parts {
        row.name.get_or_insert_with(String::new);
        row.brand.get_or_insert_with(String::new);
    }

    debug!(
        "组装完成: 工单 {} / 作业 {} / 工时 {} / 配件 {}",
        repair_orders.len(),
        jobs.len(),
        labor.len(),
        parts.len()
    );

    let tables = Tables {
        repair_orders,
        jobs,
        labor,
        parts,
    };
    (tables, report)
}

/// 取出已提取且 id 非空的行
fn keep_rows<T: Row>(outcomes: Vec<NodeOutcome<T>>, stats: &mut TableStats) -> Vec<T> {
    let mut rows = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            NodeOutcome::Extracted(row) if row.id().is_some() => rows.push(row),
            NodeOutcome::Extracted(_) => stats.null_id += 1,
            NodeOutcome::Defaulted(_) => stats.defaulted += 1,
        }
    }
    stats.kept = rows.len();
    rows
}

/// 通过 job_id 回填 repair_order_id，丢弃找不到作业的行
fn rejoin_children<T: JobChild>(
    rows: Vec<T>,
    job_to_order: &HashMap<i64, i64>,
    stats: &mut TableStats,
) -> Vec<T> {
    let mut kept = Vec::with_capacity(rows.len());
    for mut row in rows {
        match row.job_id().and_then(|job_id| job_to_order.get(&job_id)) {
            Some(&ro_id) => {
                row.set_repair_order_id(Some(ro_id));
                kept.push(row);
            }
            None => {
                debug!("丢弃孤儿行 {:?} (作业 {:?})", row.id(), row.job_id());
                stats.orphaned += 1;
            }
        }
    }
    stats.kept = kept.len();
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use crate::models::tables::{Defaulted, JobRow, LaborRow, NodeKind, PartRow, RepairOrderRow};

    fn order(id: Option<i64>) -> NodeOutcome<RepairOrderRow> {
        NodeOutcome::Extracted(RepairOrderRow {
            id,
            ..Default::default()
        })
    }

    fn job(id: i64, repair_order_id: Option<i64>) -> NodeOutcome<JobRow> {
        NodeOutcome::Extracted(JobRow {
            id: Some(id),
            repair_order_id,
            name: Some("Brakes".to_string()),
            ..Default::default()
        })
    }

    fn labor(id: i64, job_id: i64) -> NodeOutcome<LaborRow> {
        NodeOutcome::Extracted(LaborRow {
            id: Some(id),
            job_id: Some(job_id),
            ..Default::default()
        })
    }

    fn part(id: Option<i64>, job_id: i64) -> NodeOutcome<PartRow> {
        NodeOutcome::Extracted(PartRow {
            id,
            job_id: Some(job_id),
            name: Some("Rotor".to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_referential_integrity() {
        let batch = FlattenedBatch {
            repair_orders: vec![order(Some(1)), order(None)],
            jobs: vec![job(11, Some(1)), job(12, None), job(13, Some(99))],
            labor: vec![labor(101, 11), labor(102, 12), labor(103, 13)],
            parts: vec![part(Some(201), 11), part(None, 11), part(Some(202), 77)],
        };

        let (tables, report) = assemble(batch);

        assert_eq!(tables.repair_orders.len(), 1);
        assert_eq!(report.repair_orders.null_id, 1);

        assert_eq!(tables.jobs.len(), 1);
        assert_eq!(tables.jobs[0].id, Some(11));
        assert_eq!(report.jobs.orphaned, 2);

        assert_eq!(tables.labor.len(), 1);
        assert_eq!(tables.labor[0].repair_order_id, Some(1));
        assert_eq!(report.labor.orphaned, 2);

        assert_eq!(tables.parts.len(), 1);
        assert_eq!(tables.parts[0].repair_order_id, Some(1));
        assert_eq!(report.parts.null_id, 1);
        assert_eq!(report.parts.orphaned, 1);
    }

    #[test]
    fn test_text_fields_backfilled() {
        let batch = FlattenedBatch {
            repair_orders: vec![order(Some(1))],
            jobs: vec![NodeOutcome::Extracted(JobRow {
                id: Some(11),
                repair_order_id: Some(1),
                ..Default::default()
            })],
            labor: vec![labor(101, 11)],
            parts: vec![NodeOutcome::Extracted(PartRow {
                id: Some(201),
                job_id: Some(11),
                ..Default::default()
            })],
        };

        let (tables, _) = assemble(batch);
        assert_eq!(tables.jobs[0].note.as_deref(), Some(""));
        assert_eq!(tables.jobs[0].job_category_name.as_deref(), Some(""));
        assert_eq!(tables.labor[0].name.as_deref(), Some(""));
        assert_eq!(tables.parts[0].brand.as_deref(), Some(""));
        // 非文本字段保持为空
        assert_eq!(tables.parts[0].quantity, None);
    }

    #[test]
    fn test_defaulted_nodes_become_diagnostics() {
        let batch = FlattenedBatch {
            repair_orders: vec![order(Some(1))],
            jobs: vec![
                job(11, Some(1)),
                NodeOutcome::Defaulted(Defaulted {
                    kind: NodeKind::Job,
                    reason: ExtractError::missing("note"),
                    parent_id: Some(1),
                    node_id: Some(12),
                }),
            ],
            labor: vec![],
            parts: vec![],
        };

        let (tables, report) = assemble(batch);
        assert_eq!(tables.jobs.len(), 1);
        assert_eq!(report.jobs.defaulted, 1);
        assert_eq!(report.total_defaulted(), 1);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].stage, Stage::Extraction);
    }
}
