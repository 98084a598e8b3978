//! 作业分类流程 - 流程层
//!
//! 核心职责：定义“一个作业”的分类策略
//!
//! 流程顺序：
//! 1. 用户提示词过短 → 固定响应“内容不足”，不调用分类服务
//! 2. 调用分类服务 → 成功则保存原始响应
//! 3. 任何调用失败 → 固定响应“无法分类”（兜底），批次继续

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::models::classification::{ClassificationOutcome, ClassificationRequest};
use crate::services::Classifier;
use crate::utils::logging::truncate_text;
use crate::workflow::job_ctx::JobCtx;

/// 作业分类流程
///
/// - 决定是否调用分类服务
/// - 决定失败时的兜底响应
/// - 失败只归属于当前作业，不向上传播
pub struct ClassifyFlow {
    classifier: Arc<dyn Classifier>,
    min_input_chars: usize,
    verbose_logging: bool,
}

impl ClassifyFlow {
    /// 创建新的分类流程
    pub fn new(classifier: Arc<dyn Classifier>, min_input_chars: usize, verbose_logging: bool) -> Self {
        Self {
            classifier,
            min_input_chars,
            verbose_logging,
        }
    }

    /// 是否需要调用分类服务（在派发前判断）
    pub fn needs_classifier(&self, request: &ClassificationRequest) -> bool {
        request.user_prompt.chars().count() >= self.min_input_chars
    }

    pub async fn run(&self, request: &ClassificationRequest, ctx: &JobCtx) -> ClassificationOutcome {
        if !self.needs_classifier(request) {
            debug!("{} 内容不足，跳过分类", ctx);
            return ClassificationOutcome::insufficient(request);
        }

        if self.verbose_logging {
            info!("{} 输入: {}", ctx, truncate_text(&request.user_prompt, 80));
        }

        match self
            .classifier
            .classify(&request.system_prompt, &request.user_prompt)
            .await
        {
            Ok(response) => {
                debug!("{} ✓ 分类响应: {}", ctx, truncate_text(&response, 120));
                ClassificationOutcome::classified(request, response)
            }
            Err(e) => {
                warn!("{} ⚠️ 分类服务调用失败: {}", ctx, e);
                ClassificationOutcome::failed(request)
            }
        }
    }
}
