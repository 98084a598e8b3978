//! 作业文本块（soup）

/// 文本块类别，顺序即提示词中的拼接顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoupSection {
    JobDescription,
    JobCategory,
    Labor,
    PartsUsed,
}

impl SoupSection {
    /// 固定顺序
    pub const ALL: [SoupSection; 4] = [
        SoupSection::JobDescription,
        SoupSection::JobCategory,
        SoupSection::Labor,
        SoupSection::PartsUsed,
    ];

    /// 块标题
    pub fn header(self) -> &'static str {
        match self {
            SoupSection::JobDescription => "Job Description",
            SoupSection::JobCategory => "Job Category",
            SoupSection::Labor => "Labor",
            SoupSection::PartsUsed => "Parts Used",
        }
    }
}

/// 单个作业的四个文本块
///
/// 每个块要么为空字符串，要么是“标题 + 去重后的行”
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoupText {
    pub job_id: i64,
    pub repair_order_id: i64,
    pub job_description_soup: String,
    pub job_category_soup: String,
    pub labor_soup: String,
    pub parts_soup: String,
}

impl SoupText {
    pub fn section(&self, section: SoupSection) -> &str {
        match section {
            SoupSection::JobDescription => &self.job_description_soup,
            SoupSection::JobCategory => &self.job_category_soup,
            SoupSection::Labor => &self.labor_soup,
            SoupSection::PartsUsed => &self.parts_soup,
        }
    }

    /// 按固定顺序返回非空的块
    pub fn non_empty_sections(&self) -> impl Iterator<Item = (SoupSection, &str)> + '_ {
        SoupSection::ALL
            .into_iter()
            .map(move |s| (s, self.section(s)))
            .filter(|(_, text)| !text.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.non_empty_sections().next().is_none()
    }
}
