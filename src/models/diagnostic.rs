//! 批次诊断信息
//!
//! 所有不会中断批次的失败都汇总为 `Diagnostic`

use std::fmt;

/// 失败发生的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extraction,
    Classification,
    Parse,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Extraction => "提取",
            Stage::Classification => "分类",
            Stage::Parse => "解析",
        }
    }
}

/// 单条诊断
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub stage: Stage,
    pub message: String,
}

impl Diagnostic {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage.label(), self.message)
    }
}
