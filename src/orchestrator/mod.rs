//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整批数据的流转和调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `flattener` - 层级展开器
//! - 遍历工单 → 作业 → {工时, 配件}
//! - 每个节点独立提取，失败只产生占位记录
//!
//! ### `assembler` - 表组装
//! - 丢弃空 id 和无法关联的行
//! - 通过作业回填工时、配件的工单 id
//!
//! ### `batch_processor` - 批量处理器
//! - 管理应用生命周期（初始化、运行）
//! - 控制并发数量（Semaphore）
//! - 写出所有表格和诊断
//! - 输出全局统计信息
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理整个文档)
//!     ↓
//! flattener → assembler (文档 → 四张表)
//!     ↓
//! workflow::ClassifyFlow (处理单个作业)
//!     ↓
//! services (能力层：synthesize / prompt / llm / parse / write)
//! ```

pub mod assembler;
pub mod batch_processor;
pub mod flattener;

// 重新导出主要类型
pub use assembler::{assemble, AssemblyReport, TableStats};
pub use batch_processor::{App, RunOutput, RunStats};
pub use flattener::{flatten_document, flatten_repair_order, FlattenedBatch};
