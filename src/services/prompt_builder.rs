//! 提示词构建 - 业务能力层
//!
//! 只为作业中实际出现的文本块附加对应的示例，保持提示词最小

use phf::phf_map;

use crate::models::classification::ClassificationRequest;
use crate::models::soup::{SoupSection, SoupText};

/// 单个类别的固定示例
pub struct WorkedExample {
    pub input: &'static str,
    pub labels: &'static [&'static str],
}

/// 按块标题索引的示例
static WORKED_EXAMPLES: phf::Map<&'static str, WorkedExample> = phf_map! {
    "Job Description" => WorkedExample {
        input: "Job Description:\nLube, Oil and Filter\nCustomer states oil light is on",
        labels: &["Engine Oil", "Oil Filter"],
    },
    "Job Category" => WorkedExample {
        input: "Job Category:\nMaintenance",
        labels: &["Inspection"],
    },
    "Labor" => WorkedExample {
        input: "Labor:\nDrain and refill engine oil\nMulti-point inspection",
        labels: &["Engine Oil", "Inspection"],
    },
    "Parts Used" => WorkedExample {
        input: "Parts Used:\nFull Synthetic 5W-30\nOil Filter",
        labels: &["Engine Oil", "Oil Filter"],
    },
};

/// 提示词构建器
///
/// 职责：
/// - 持有只读的分类体系
/// - 为单个作业构建分类请求
/// - 不调用分类服务
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    taxonomy: Vec<String>,
}

impl PromptBuilder {
    pub fn new(taxonomy: Vec<String>) -> Self {
        Self { taxonomy }
    }

    /// 为一个作业构建分类请求
    pub fn build(&self, soup: &SoupText) -> ClassificationRequest {
        let sections: Vec<SoupSection> = soup.non_empty_sections().map(|(s, _)| s).collect();

        ClassificationRequest {
            job_id: soup.job_id,
            repair_order_id: soup.repair_order_id,
            system_prompt: self.system_prompt(&sections),
            user_prompt: user_prompt(soup),
        }
    }

    /// 构建系统提示词
    ///
    /// 示例输入只包含 `sections` 中出现的类别，顺序固定
    pub fn system_prompt(&self, sections: &[SoupSection]) -> String {
        let taxonomy_list = self
            .taxonomy
            .iter()
            .map(|label| format!("- {}", label))
            .collect::<Vec<_>>()
            .join("\n");

        let mut example_inputs = Vec::new();
        let mut example_labels: Vec<&str> = Vec::new();
        for section in SoupSection::ALL {
            if !sections.contains(&section) {
                continue;
            }
            let Some(example) = WORKED_EXAMPLES.get(section.header()) else {
                continue;
            };
            let labels: Vec<&str> = example
                .labels
                .iter()
                .copied()
                .filter(|label| self.in_taxonomy(label))
                .collect();
            // 标签全部不在分类体系中时，整个示例都不展示
            if labels.is_empty() {
                continue;
            }
            example_inputs.push(example.input);
            for label in labels {
                if !example_labels.contains(&label) {
                    example_labels.push(label);
                }
            }
        }

        let mut prompt = format!(
            r#"You are an automotive service advisor. Classify the repair job described by the user into standard service names.

Return ONLY a comma-separated list of service names drawn from the list below, written as a list literal such as ['Engine Oil', 'Oil Filter'].
Do not use names that are not in the list. If no service name applies, return [].

Standard service names:
{}"#,
            taxonomy_list
        );

        if !example_inputs.is_empty() {
            prompt.push_str(&format!(
                "\n\nExample input:\n{}\n\nExample output:\n{}",
                example_inputs.join("\n\n"),
                format_label_list(&example_labels)
            ));
        }

        prompt
    }

    fn in_taxonomy(&self, label: &str) -> bool {
        self.taxonomy.iter().any(|t| t == label)
    }
}

/// 用户提示词：按固定顺序拼接非空文本块
pub fn user_prompt(soup: &SoupText) -> String {
    soup.non_empty_sections()
        .map(|(_, text)| text)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// 格式化为列表字面量，例如 `['Engine Oil', 'Oil Filter']`
pub fn format_label_list(labels: &[&str]) -> String {
    let items = labels
        .iter()
        .map(|label| format!("'{}'", label.replace('\\', "\\\\").replace('\'', "\\'")))
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{}]", items)
}
