//! 表格写入服务 - 业务能力层
//!
//! 只负责“把一张表写成带表头的 CSV 文件”能力，不关心表从哪里来

use std::fs;
use std::path::PathBuf;
use tracing::debug;

use crate::error::OutputError;
use crate::models::classification::{ClassificationOutcome, ServiceLabel};
use crate::models::soup::SoupText;
use crate::models::tables::{JobRow, LaborRow, PartRow, RepairOrderRow};

/// 可以写成一行 CSV 的记录
pub trait TableRecord {
    /// 表头
    fn header() -> &'static [&'static str];
    /// 与表头顺序一致的字段
    fn fields(&self) -> Vec<String>;
}

/// 表格写入服务
///
/// 职责：
/// - 每张表一个文件
/// - 第一行为表头
/// - 包含分隔符、引号或换行的字段加引号转义
pub struct TableWriter {
    output_dir: PathBuf,
}

impl TableWriter {
    /// 创建写入服务，目录不存在时创建
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, OutputError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|source| OutputError::CreateDirFailed {
            path: output_dir.display().to_string(),
            source,
        })?;
        Ok(Self { output_dir })
    }

    /// 写入一张表
    ///
    /// # 参数
    /// - `table_name`: 表名（文件名为 `<table_name>.csv`）
    /// - `rows`: 表中的行
    ///
    /// # 返回
    /// 返回写入的文件路径
    pub fn write<T: TableRecord>(&self, table_name: &str, rows: &[T]) -> Result<PathBuf, OutputError> {
        let path = self.output_dir.join(format!("{}.csv", table_name));
        let content = render_csv(rows);

        fs::write(&path, content)
            .map_err(|source| OutputError::write_failed(path.display().to_string(), source))?;

        debug!("写入表格 {}: {} 行", path.display(), rows.len());
        Ok(path)
    }
}

/// 渲染为 CSV 文本
pub fn render_csv<T: TableRecord>(rows: &[T]) -> String {
    let mut out = String::new();
    push_line(&mut out, T::header().iter().map(|h| h.to_string()));
    for row in rows {
        push_line(&mut out, row.fields());
    }
    out
}

fn push_line(out: &mut String, fields: impl IntoIterator<Item = String>) {
    let line = fields
        .into_iter()
        .map(|f| escape_field(&f))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push('\n');
}

/// 按 RFC 4180 转义单个字段
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

// ========== 各表的字段映射 ==========

impl TableRecord for RepairOrderRow {
    fn header() -> &'static [&'static str] {
        &[
            "id",
            "repair_order_number",
            "shop_id",
            "vehicle_id",
            "customer_id",
            "miles_in",
            "miles_out",
            "completed_date",
            "posted_date",
        ]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            opt(&self.id),
            opt(&self.repair_order_number),
            opt(&self.shop_id),
            opt(&self.vehicle_id),
            opt(&self.customer_id),
            opt(&self.miles_in),
            opt(&self.miles_out),
            opt(&self.completed_date),
            opt(&self.posted_date),
        ]
    }
}

impl TableRecord for JobRow {
    fn header() -> &'static [&'static str] {
        &[
            "id",
            "repair_order_id",
            "vehicle_id",
            "customer_id",
            "name",
            "note",
            "job_category_name",
            "created_date",
            "completed_date",
            "updated_date",
        ]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            opt(&self.id),
            opt(&self.repair_order_id),
            opt(&self.vehicle_id),
            opt(&self.customer_id),
            opt(&self.name),
            opt(&self.note),
            opt(&self.job_category_name),
            opt(&self.created_date),
            opt(&self.completed_date),
            opt(&self.updated_date),
        ]
    }
}

impl TableRecord for LaborRow {
    fn header() -> &'static [&'static str] {
        &[
            "id",
            "name",
            "rate",
            "hours",
            "complete",
            "technician_id",
            "job_id",
            "repair_order_id",
        ]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            opt(&self.id),
            opt(&self.name),
            opt(&self.rate),
            opt(&self.hours),
            opt(&self.complete),
            opt(&self.technician_id),
            opt(&self.job_id),
            opt(&self.repair_order_id),
        ]
    }
}

impl TableRecord for PartRow {
    fn header() -> &'static [&'static str] {
        &[
            "id",
            "quantity",
            "brand",
            "name",
            "part_number",
            "job_id",
            "repair_order_id",
        ]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            opt(&self.id),
            opt(&self.quantity),
            opt(&self.brand),
            opt(&self.name),
            opt(&self.part_number),
            opt(&self.job_id),
            opt(&self.repair_order_id),
        ]
    }
}

impl TableRecord for SoupText {
    fn header() -> &'static [&'static str] {
        &[
            "job_id",
            "repair_order_id",
            "job_description_soup",
            "job_category_soup",
            "labor_soup",
            "parts_soup",
        ]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.job_id.to_string(),
            self.repair_order_id.to_string(),
            self.job_description_soup.clone(),
            self.job_category_soup.clone(),
            self.labor_soup.clone(),
            self.parts_soup.clone(),
        ]
    }
}

impl TableRecord for ClassificationOutcome {
    fn header() -> &'static [&'static str] {
        &["job_id", "repair_order_id", "status", "response"]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.job_id.to_string(),
            self.repair_order_id.to_string(),
            self.status.to_string(),
            self.response.clone(),
        ]
    }
}

impl TableRecord for ServiceLabel {
    fn header() -> &'static [&'static str] {
        &[
            "repair_order_id",
            "completed_date",
            "miles_in",
            "miles_out",
            "customer_id",
            "vehicle_id",
            "service_response",
        ]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.repair_order_id.to_string(),
            opt(&self.completed_date),
            opt(&self.miles_in),
            opt(&self.miles_out),
            opt(&self.customer_id),
            opt(&self.vehicle_id),
            self.service_response.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("Rotor"), "Rotor");
        assert_eq!(escape_field("Pads, front"), "\"Pads, front\"");
        assert_eq!(escape_field("5\" hose"), "\"5\"\" hose\"");
        assert_eq!(escape_field("Labor:\nReplace"), "\"Labor:\nReplace\"");
    }

    #[test]
    fn test_render_csv_header_and_nulls() {
        let rows = vec![PartRow {
            id: Some(1),
            quantity: Some(2.0),
            name: Some("Rotor".to_string()),
            job_id: Some(9),
            ..Default::default()
        }];

        let csv = render_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "id,quantity,brand,name,part_number,job_id,repair_order_id"
        );
        assert_eq!(lines[1], "1,2,,Rotor,,9,");
    }

    #[test]
    fn test_write_creates_file_per_table() {
        let dir = tempfile::tempdir().unwrap();
        let writer = TableWriter::new(dir.path().join("out")).unwrap();

        let path = writer.write::<LaborRow>("labor", &[]).unwrap();
        assert!(path.ends_with("labor.csv"));

        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }
}
