//! 分类请求、分类结果和最终标签行

use std::fmt;

/// 内容不足时的固定响应
pub const INSUFFICIENT_DATA: &str = "Insufficient Data";
/// 分类服务调用失败时的固定响应
pub const UNABLE_TO_CLASSIFY: &str = "Unable to Classify";

/// 分类请求（构建后不再修改）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRequest {
    pub job_id: i64,
    pub repair_order_id: i64,
    /// 分类体系 + 示例 + 指令
    pub system_prompt: String,
    /// 作业的非空文本块
    pub user_prompt: String,
}

/// 分类状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyStatus {
    /// 已获得分类服务的响应
    Classified,
    /// 内容不足，未调用分类服务
    InsufficientData,
    /// 调用失败
    Failed,
}

impl ClassifyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassifyStatus::Classified => "classified",
            ClassifyStatus::InsufficientData => "insufficient_data",
            ClassifyStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ClassifyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 分类结果，与请求分开保存
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationOutcome {
    pub job_id: i64,
    pub repair_order_id: i64,
    pub status: ClassifyStatus,
    /// 原始响应文本或固定响应
    pub response: String,
}

impl ClassificationOutcome {
    pub fn classified(request: &ClassificationRequest, response: String) -> Self {
        Self::with_status(request, ClassifyStatus::Classified, response)
    }

    pub fn insufficient(request: &ClassificationRequest) -> Self {
        Self::with_status(
            request,
            ClassifyStatus::InsufficientData,
            INSUFFICIENT_DATA.to_string(),
        )
    }

    pub fn failed(request: &ClassificationRequest) -> Self {
        Self::with_status(request, ClassifyStatus::Failed, UNABLE_TO_CLASSIFY.to_string())
    }

    fn with_status(request: &ClassificationRequest, status: ClassifyStatus, response: String) -> Self {
        Self {
            job_id: request.job_id,
            repair_order_id: request.repair_order_id,
            status,
            response,
        }
    }
}

/// 最终输出的服务标签行
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceLabel {
    pub repair_order_id: i64,
    pub completed_date: Option<String>,
    pub miles_in: Option<f64>,
    pub miles_out: Option<f64>,
    pub customer_id: Option<i64>,
    pub vehicle_id: Option<i64>,
    pub service_response: String,
}
