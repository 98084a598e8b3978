//! 批量工单处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次完整运行的调度和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：校验配置、初始化诊断文件、创建分类服务
//! 2. **展开与组装**：文档 → 四张关系表
//! 3. **文本合成**：每个作业一个文本块，构建分类请求
//! 4. **并发控制**：使用 Semaphore 限制同时进行的分类请求
//! 5. **解析与输出**：展开标签、写出所有表格和诊断
//! 6. **全局统计**：汇总整次运行的结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个作业的细节，委托 `ClassifyFlow`
//! - **失败隔离**：单个作业的失败只记入诊断，批次继续

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::classification::{ClassificationOutcome, ClassificationRequest, ClassifyStatus, ServiceLabel};
use crate::models::diagnostic::{Diagnostic, Stage};
use crate::models::loaders::load_document;
use crate::models::record::RawDocument;
use crate::models::soup::SoupText;
use crate::models::tables::Tables;
use crate::orchestrator::assembler::{assemble, AssemblyReport};
use crate::orchestrator::flattener::flatten_document;
use crate::services::text_synthesizer::build_soup_table;
use crate::services::{
    Classifier, DiagnosticWriter, LlmService, PromptBuilder, ResponseParser, TableWriter,
};
use crate::utils::logging::{
    init_log_file, log_classification_complete, log_classification_start, log_document_loaded,
    log_startup, print_final_stats,
};
use crate::workflow::{ClassifyFlow, JobCtx};

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<ClassifyFlow>,
    prompt_builder: PromptBuilder,
    parser: ResponseParser,
}

impl App {
    /// 初始化应用（使用真实的分类服务）
    pub fn initialize(config: Config) -> Result<Self> {
        config.validate()?;

        init_log_file(&config.diagnostics_file)?;

        let llm = LlmService::new(&config);
        log_startup(llm.model_name(), config.max_concurrent_requests);

        Ok(Self::with_classifier(config, Arc::new(llm)))
    }

    /// 使用指定的分类服务创建应用
    pub fn with_classifier(config: Config, classifier: Arc<dyn Classifier>) -> Self {
        let flow = ClassifyFlow::new(classifier, config.min_input_chars, config.verbose_logging);
        let prompt_builder = PromptBuilder::new(config.taxonomy.clone());
        let parser = ResponseParser::new(config.taxonomy.clone(), config.strict_taxonomy);

        Self {
            config,
            flow: Arc::new(flow),
            prompt_builder,
            parser,
        }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<RunStats> {
        let document = load_document(Path::new(&self.config.input_file)).await?;
        log_document_loaded(document.len(), &self.config.input_file);

        if document.is_empty() {
            warn!("⚠️ 文档中没有工单，将输出空表");
        }

        let output = self.process(&document).await;
        self.write_outputs(&output)?;

        print_final_stats(&output.stats.as_pairs(), &self.config.output_dir);
        Ok(output.stats)
    }

    /// 处理整个文档（不写文件）
    pub async fn process(&self, document: &RawDocument) -> RunOutput {
        info!("\n📁 正在展开工单层级...");
        let (tables, assembly) = assemble(flatten_document(document));
        log_assembly(&tables, &assembly);

        let soups = build_soup_table(&tables);
        let requests: Vec<ClassificationRequest> =
            soups.iter().map(|soup| self.prompt_builder.build(soup)).collect();

        let outcomes = self.classify_all(requests).await;

        let report = self.parser.explode(&outcomes, &tables.repair_orders);
        info!(
            "✓ 解析出 {} 个标签行（无法解析 {} 个，丢弃体系外标签 {} 个）",
            report.labels.len(),
            report.unparsable,
            report.off_taxonomy
        );

        let mut diagnostics = assembly.diagnostics.clone();
        diagnostics.extend(
            outcomes
                .iter()
                .filter(|o| o.status == ClassifyStatus::Failed)
                .map(|o| {
                    Diagnostic::new(
                        Stage::Classification,
                        format!("作业 {} (工单 {}): 分类服务调用失败", o.job_id, o.repair_order_id),
                    )
                }),
        );
        diagnostics.extend(report.diagnostics);

        let stats = RunStats {
            repair_orders: tables.repair_orders.len(),
            jobs: tables.jobs.len(),
            labor: tables.labor.len(),
            parts: tables.parts.len(),
            defaulted: assembly.total_defaulted(),
            classified: count_status(&outcomes, ClassifyStatus::Classified),
            insufficient: count_status(&outcomes, ClassifyStatus::InsufficientData),
            failed: count_status(&outcomes, ClassifyStatus::Failed),
            unparsable: report.unparsable,
            labels: report.labels.len(),
        };

        RunOutput {
            tables,
            soups,
            outcomes,
            labels: report.labels,
            diagnostics,
            stats,
        }
    }

    /// 并发分类所有请求，结果顺序与请求一致
    ///
    /// 内容不足的请求在派发前就地处理，不占用并发名额
    async fn classify_all(&self, requests: Vec<ClassificationRequest>) -> Vec<ClassificationOutcome> {
        let total = requests.len();
        let max_concurrent = self.config.max_concurrent_requests.max(1);
        let to_classify = requests
            .iter()
            .filter(|r| self.flow.needs_classifier(r))
            .count();
        log_classification_start(total, to_classify, max_concurrent);

        let semaphore = Arc::new(Semaphore::new(max_concurrent));
        let mut outcomes: Vec<Option<ClassificationOutcome>> = vec![None; total];
        let mut handles = Vec::new();

        for (idx, request) in requests.iter().enumerate() {
            let ctx = JobCtx::new(request.job_id, request.repair_order_id, idx + 1, total);

            if !self.flow.needs_classifier(request) {
                outcomes[idx] = Some(self.flow.run(request, &ctx).await);
                continue;
            }

            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!("{} ❌ 无法获取并发名额: {}", ctx, e);
                    outcomes[idx] = Some(ClassificationOutcome::failed(request));
                    continue;
                }
            };

            let flow = self.flow.clone();
            let request_clone = request.clone();
            let handle = tokio::spawn(async move {
                let _permit = permit;
                flow.run(&request_clone, &ctx).await
            });
            handles.push((idx, handle));
        }

        for (idx, handle) in handles {
            outcomes[idx] = Some(match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("[作业 {}] 任务执行失败: {}", requests[idx].job_id, e);
                    ClassificationOutcome::failed(&requests[idx])
                }
            });
        }

        let outcomes: Vec<ClassificationOutcome> = outcomes
            .into_iter()
            .zip(&requests)
            .map(|(outcome, request)| outcome.unwrap_or_else(|| ClassificationOutcome::failed(request)))
            .collect();

        log_classification_complete(count_status(&outcomes, ClassifyStatus::Classified), to_classify);
        outcomes
    }

    /// 写出所有表格和诊断
    fn write_outputs(&self, output: &RunOutput) -> AppResult<()> {
        let writer = TableWriter::new(&self.config.output_dir)?;

        writer.write("repair_orders", &output.tables.repair_orders)?;
        writer.write("jobs", &output.tables.jobs)?;
        writer.write("labor", &output.tables.labor)?;
        writer.write("parts", &output.tables.parts)?;
        writer.write("job_soup", &output.soups)?;
        writer.write("classification", &output.outcomes)?;
        writer.write("parsed_response", &output.labels)?;

        let written = DiagnosticWriter::with_path(&self.config.diagnostics_file)
            .write_all(&output.diagnostics)?;
        if written > 0 {
            warn!(
                "⚠️ 共 {} 条诊断，已写入 {}",
                written, self.config.diagnostics_file
            );
        }

        Ok(())
    }
}

/// 一次运行的全部产物
#[derive(Debug)]
pub struct RunOutput {
    pub tables: Tables,
    pub soups: Vec<SoupText>,
    pub outcomes: Vec<ClassificationOutcome>,
    pub labels: Vec<ServiceLabel>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: RunStats,
}

/// 运行统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub repair_orders: usize,
    pub jobs: usize,
    pub labor: usize,
    pub parts: usize,
    pub defaulted: usize,
    pub classified: usize,
    pub insufficient: usize,
    pub failed: usize,
    pub unparsable: usize,
    pub labels: usize,
}

impl RunStats {
    fn as_pairs(&self) -> [(&'static str, usize); 10] {
        [
            ("🧾 工单", self.repair_orders),
            ("🔧 作业", self.jobs),
            ("⏱ 工时", self.labor),
            ("📦 配件", self.parts),
            ("⚠️ 占位节点", self.defaulted),
            ("✅ 已分类", self.classified),
            ("📭 内容不足", self.insufficient),
            ("❌ 分类失败", self.failed),
            ("❓ 无法解析", self.unparsable),
            ("🏷 标签行", self.labels),
        ]
    }
}

fn count_status(outcomes: &[ClassificationOutcome], status: ClassifyStatus) -> usize {
    outcomes.iter().filter(|o| o.status == status).count()
}

fn log_assembly(tables: &Tables, report: &AssemblyReport) {
    info!(
        "✓ 工单 {} / 作业 {} / 工时 {} / 配件 {}",
        tables.repair_orders.len(),
        tables.jobs.len(),
        tables.labor.len(),
        tables.parts.len()
    );
    if report.total_defaulted() > 0 {
        warn!("⚠️ {} 个节点提取失败，已记入诊断", report.total_defaulted());
    }
    let orphaned = report.jobs.orphaned + report.labor.orphaned + report.parts.orphaned;
    if orphaned > 0 {
        warn!("⚠️ 丢弃 {} 个无法关联的行", orphaned);
    }
}
