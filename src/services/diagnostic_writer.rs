//! 诊断写入服务 - 业务能力层
//!
//! 只负责“追加写诊断文件”能力，不关心诊断从哪里来

use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

use crate::error::OutputError;
use crate::models::diagnostic::Diagnostic;

/// 诊断写入服务
///
/// 职责：
/// - 将不影响批次的失败写入诊断文件
/// - 一条诊断一行
/// - 不关心流程顺序
pub struct DiagnosticWriter {
    file_path: String,
}

impl DiagnosticWriter {
    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            file_path: path.into(),
        }
    }

    /// 追加写入所有诊断
    ///
    /// # 返回
    /// 返回写入的条数
    pub fn write_all(&self, diagnostics: &[Diagnostic]) -> Result<usize, OutputError> {
        debug!("写入 {} 条诊断到 {}", diagnostics.len(), self.file_path);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)
            .map_err(|source| OutputError::write_failed(&self.file_path, source))?;

        for diagnostic in diagnostics {
            writeln!(file, "{}", diagnostic)
                .map_err(|source| OutputError::write_failed(&self.file_path, source))?;
        }

        Ok(diagnostics.len())
    }
}

impl Default for DiagnosticWriter {
    fn default() -> Self {
        Self::with_path("diagnostics.txt")
    }
}
