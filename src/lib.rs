//! # Repair Order Classify
//!
//! 把维修工单导出文档整理为关系表，并为每个作业生成服务分类标签
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 数据模型（Models）
//! - `models/` - 原始文档、四张关系表、文本块、分类请求与结果
//! - `loaders` - 读取 JSON 导出文档
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个服务只做一件事
//! - `field_extractor` - 字段提取与命名规范化
//! - `text_synthesizer` - 作业文本块合成
//! - `PromptBuilder` - 构建分类提示词
//! - `LlmService` - 分类服务调用
//! - `ResponseParser` - 解析响应、展开标签、去重
//! - `TableWriter` / `DiagnosticWriter` - 写表格与诊断
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个作业"的分类流程
//! - `JobCtx` - 上下文封装（作业 id + 工单 id + 序号）
//! - `ClassifyFlow` - 跳过判断 → 调用 → 兜底
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/flattener` - 层级展开，失败隔离
//! - `orchestrator/assembler` - 引用完整性
//! - `orchestrator/batch_processor` - 并发调度、输出、统计
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod logger;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{ClassificationOutcome, RawDocument, ServiceLabel, SoupText, Tables};
pub use orchestrator::{App, RunOutput, RunStats};
pub use services::Classifier;
pub use workflow::{ClassifyFlow, JobCtx};
