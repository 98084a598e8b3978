/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use anyhow::{Context, Result};
use std::fs;
use tracing::info;

/// 初始化诊断文件，写入带时间戳的文件头
///
/// # 参数
/// - `log_file_path`: 文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n工单分类诊断日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .with_context(|| format!("无法写入诊断文件: {}", log_file_path))?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `model`: 模型名称
/// - `max_concurrent`: 最大并发数
pub fn log_startup(model: &str, max_concurrent: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 工单解析与服务分类");
    info!("🤖 分类模型: {}", model);
    info!("📊 最大并发数: {}", max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 记录文档加载信息
pub fn log_document_loaded(repair_orders: usize, path: &str) {
    info!("✓ 从 {} 读取到 {} 个工单", path, repair_orders);
}

/// 记录分类批次开始信息
///
/// # 参数
/// - `total`: 工作项总数
/// - `to_classify`: 需要调用分类服务的数量
/// - `max_concurrent`: 最大并发数
pub fn log_classification_start(total: usize, to_classify: usize, max_concurrent: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始分类 {} 个工作项", total);
    info!(
        "📄 其中 {} 个需要调用分类服务，{} 个内容不足直接跳过",
        to_classify,
        total - to_classify
    );
    info!("📋 并发上限: {}", max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 记录分类批次完成信息
pub fn log_classification_complete(classified: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 分类完成: 成功 {}/{}", classified, total);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `stats`: (标题, 数量) 列表
/// - `output_dir`: 输出目录
pub fn print_final_stats(stats: &[(&str, usize)], output_dir: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    for (label, count) in stats {
        info!("{}: {}", label, count);
    }
    info!("{}", "=".repeat(60));
    info!("\n输出表格已保存至: {}", output_dir);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
