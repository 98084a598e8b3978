//! 文本合成 - 业务能力层
//!
//! 把作业的自由文本、工时名称、配件名称整理为带标题的文本块。
//! 去重使用有序集合，输出与输入顺序无关。

use std::collections::{BTreeSet, HashMap};

use crate::models::soup::{SoupSection, SoupText};
use crate::models::tables::{JobRow, Tables};

/// 合成作业描述块（名称 + 备注）
pub fn synthesize_job_text(name: &str, note: &str) -> String {
    synthesize_list_text([name, note], SoupSection::JobDescription.header())
}

/// 合成作业类别块
pub fn synthesize_category_text(category: &str) -> String {
    synthesize_list_text([category], SoupSection::JobCategory.header())
}

/// 去重、换行拼接并加标题
///
/// 空白值被忽略；没有可用内容时返回空字符串
pub fn synthesize_list_text<'a, I>(values: I, header: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let lines: BTreeSet<&str> = values
        .into_iter()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect();

    if lines.is_empty() {
        return String::new();
    }

    let body = lines.into_iter().collect::<Vec<_>>().join("\n");
    format!("{}:\n{}", header, body)
}

/// 为一个作业合成四个文本块
pub fn synthesize_job_soup<'a>(
    job: &JobRow,
    job_id: i64,
    repair_order_id: i64,
    labor_names: impl IntoIterator<Item = &'a str>,
    part_names: impl IntoIterator<Item = &'a str>,
) -> SoupText {
    SoupText {
        job_id,
        repair_order_id,
        job_description_soup: synthesize_job_text(
            job.name.as_deref().unwrap_or_default(),
            job.note.as_deref().unwrap_or_default(),
        ),
        job_category_soup: synthesize_category_text(
            job.job_category_name.as_deref().unwrap_or_default(),
        ),
        labor_soup: synthesize_list_text(labor_names, SoupSection::Labor.header()),
        parts_soup: synthesize_list_text(part_names, SoupSection::PartsUsed.header()),
    }
}

/// 为组装后的所有作业合成文本块
///
/// 工时和配件按 job_id 分组；作业顺序与 jobs 表一致
pub fn build_soup_table(tables: &Tables) -> Vec<SoupText> {
    let mut labor_by_job: HashMap<i64, Vec<&str>> = HashMap::new();
    for labor in &tables.labor {
        if let (Some(job_id), Some(name)) = (labor.job_id, labor.name.as_deref()) {
            labor_by_job.entry(job_id).or_default().push(name);
        }
    }

    let mut parts_by_job: HashMap<i64, Vec<&str>> = HashMap::new();
    for part in &tables.parts {
        if let (Some(job_id), Some(name)) = (part.job_id, part.name.as_deref()) {
            parts_by_job.entry(job_id).or_default().push(name);
        }
    }

    tables
        .jobs
        .iter()
        .filter_map(|job| {
            let job_id = job.id?;
            let repair_order_id = job.repair_order_id?;
            let labor = labor_by_job.get(&job_id).map(Vec::as_slice).unwrap_or_default();
            let parts = parts_by_job.get(&job_id).map(Vec::as_slice).unwrap_or_default();
            Some(synthesize_job_soup(
                job,
                job_id,
                repair_order_id,
                labor.iter().copied(),
                parts.iter().copied(),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tables::{LaborRow, PartRow};

    #[test]
    fn test_synthesize_job_text() {
        assert_eq!(
            synthesize_job_text("Brake Service", "Customer reports squeal"),
            "Job Description:\nBrake Service\nCustomer reports squeal"
        );
        // 名称和备注相同只保留一行
        assert_eq!(
            synthesize_job_text("Oil Change", "Oil Change"),
            "Job Description:\nOil Change"
        );
        assert_eq!(synthesize_job_text("", "  "), "");
    }

    #[test]
    fn test_synthesize_category_text() {
        assert_eq!(synthesize_category_text(""), "");
        assert_eq!(
            synthesize_category_text("Maintenance"),
            "Job Category:\nMaintenance"
        );
    }

    #[test]
    fn test_list_text_order_independent_and_deduplicated() {
        let a = synthesize_list_text(["brake pad", "brake pad", "rotor"], "Parts Used");
        let b = synthesize_list_text(["rotor", "brake pad"], "Parts Used");
        assert_eq!(a, b);

        let lines: Vec<&str> = a.lines().skip(1).collect();
        assert_eq!(lines, vec!["brake pad", "rotor"]);
        assert!(!a.ends_with('\n'));
        assert!(!a.starts_with('\n'));
    }

    #[test]
    fn test_build_soup_table_groups_by_job() {
        let tables = Tables {
            repair_orders: Vec::new(),
            jobs: vec![
                JobRow {
                    id: Some(1),
                    repair_order_id: Some(100),
                    name: Some("Brakes".to_string()),
                    note: Some(String::new()),
                    job_category_name: Some(String::new()),
                    ..Default::default()
                },
                JobRow {
                    id: Some(2),
                    repair_order_id: Some(100),
                    name: Some(String::new()),
                    note: Some(String::new()),
                    job_category_name: Some(String::new()),
                    ..Default::default()
                },
            ],
            labor: vec![LaborRow {
                id: Some(10),
                name: Some("Replace pads".to_string()),
                job_id: Some(1),
                ..Default::default()
            }],
            parts: vec![PartRow {
                id: Some(20),
                name: Some("Pad set".to_string()),
                job_id: Some(1),
                ..Default::default()
            }],
        };

        let soups = build_soup_table(&tables);
        assert_eq!(soups.len(), 2);

        assert_eq!(soups[0].labor_soup, "Labor:\nReplace pads");
        assert_eq!(soups[0].parts_soup, "Parts Used:\nPad set");
        assert_eq!(soups[0].job_category_soup, "");
        assert!(soups[1].is_empty());
    }
}
