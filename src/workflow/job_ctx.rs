//! 作业处理上下文
//!
//! 封装“我正在处理哪个工单的哪个作业”这一信息

use std::fmt::Display;

/// 作业处理上下文
#[derive(Debug, Clone)]
pub struct JobCtx {
    /// 作业ID
    pub job_id: i64,

    /// 所属工单ID
    pub repair_order_id: i64,

    /// 作业在本批中的序号（从1开始，仅用于日志显示）
    pub job_index: usize,

    /// 本批作业总数
    pub total: usize,
}

impl JobCtx {
    /// 创建新的作业上下文
    pub fn new(job_id: i64, repair_order_id: i64, job_index: usize, total: usize) -> Self {
        Self {
            job_id,
            repair_order_id,
            job_index,
            total,
        }
    }
}

impl Display for JobCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[作业 {}/{} ID#{} 工单#{}]",
            self.job_index, self.total, self.job_id, self.repair_order_id
        )
    }
}
