use super::status::StatusCounts;

/// 编辑会话统计信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorStats {
    pub name: String,
    pub revision: u64,
    pub issue_count: usize,
    pub counts: StatusCounts,
    pub change_count: usize,
    pub baseline_chars: usize,
    pub content_chars: usize,
}

impl std::fmt::Display for EditorStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== 编辑统计信息 ===")?;
        writeln!(f, "文档: {}", self.name)?;
        writeln!(f, "版本: {}", self.revision)?;
        writeln!(f, "问题数量: {}", self.issue_count)?;
        writeln!(
            f,
            "  待处理: {}, 应用中: {}, 已应用: {}, 已拒绝: {}, 失败: {}",
            self.counts.pending,
            self.counts.applying,
            self.counts.applied,
            self.counts.rejected,
            self.counts.failed
        )?;
        writeln!(f, "变更数量: {}", self.change_count)?;
        writeln!(f, "字符数: {} -> {}", self.baseline_chars, self.content_chars)?;
        Ok(())
    }
}
