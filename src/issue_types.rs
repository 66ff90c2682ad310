use serde::{Deserialize, Serialize};

/// 审阅问题结构
///
/// 此结构对应外部分析服务产出的问题记录（JSON 字段为 camelCase）：
/// - `original_text`：问题声称要替换的原文
/// - `recommended_text`：建议替换成的文本
/// - `position`：分析时记录的字符偏移，可能已经过期
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// 唯一标识（在问题整个生命周期内保持不变）
    pub id: String,
    /// 分类标签（仅用于展示分组）
    #[serde(rename = "type", default)]
    pub issue_type: String,
    /// 原文
    pub original_text: String,
    /// 建议文本
    pub recommended_text: String,
    /// 审阅说明
    #[serde(default)]
    pub comment: String,
    /// 记录的位置（字符偏移，半开区间）
    pub position: Position,
    /// 当前状态
    #[serde(default)]
    pub status: IssueStatus,
}

impl Issue {
    /// 创建新的待处理问题
    pub fn new(
        id: impl Into<String>,
        issue_type: impl Into<String>,
        original_text: impl Into<String>,
        recommended_text: impl Into<String>,
        comment: impl Into<String>,
        position: Position,
    ) -> Self {
        Issue {
            id: id.into(),
            issue_type: issue_type.into(),
            original_text: original_text.into(),
            recommended_text: recommended_text.into(),
            comment: comment.into(),
            position,
            status: IssueStatus::Pending,
        }
    }

    /// 返回覆盖了状态的副本
    pub fn with_status(mut self, status: IssueStatus) -> Self {
        self.status = status;
        self
    }

    /// 当前内容中应当能找到的文本
    ///
    /// 已应用的问题，原文已被替换，能找到的是建议文本。
    pub fn expected_text(&self) -> &str {
        match self.status {
            IssueStatus::Applied => &self.recommended_text,
            _ => &self.original_text,
        }
    }

    /// 与 `expected_text` 对应的位置提示
    pub fn expected_position(&self) -> Position {
        match self.status {
            IssueStatus::Applied => Position::new(
                self.position.start,
                self.position.start + self.recommended_text.chars().count(),
            ),
            _ => self.position,
        }
    }
}

/// 字符位置（半开区间 `[start, end)`，单位为 Unicode 字符）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub start: usize,
    pub end: usize,
}

impl Position {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 按偏移量平移（用于测试过期位置等场景）
    pub fn shifted(&self, delta: isize) -> Self {
        let shift = |v: usize| {
            if delta >= 0 {
                v.saturating_add(delta as usize)
            } else {
                v.saturating_sub(delta.unsigned_abs())
            }
        };
        Self::new(shift(self.start), shift(self.end))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// 问题状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    #[default]
    Pending,
    Applying,
    Applied,
    Rejected,
    Failed,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Pending => "pending",
            IssueStatus::Applying => "applying",
            IssueStatus::Applied => "applied",
            IssueStatus::Rejected => "rejected",
            IssueStatus::Failed => "failed",
        }
    }

    /// 是否为终态（applied / rejected 不可逆）
    pub fn is_terminal(&self) -> bool {
        matches!(self, IssueStatus::Applied | IssueStatus::Rejected)
    }
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_wire_shape() {
        let json = r#"{
            "id": "iss-1",
            "type": "grammar",
            "originalText": "quick",
            "recommendedText": "slow",
            "comment": "tone",
            "position": { "start": 2, "end": 7 },
            "status": "pending"
        }"#;

        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.id, "iss-1");
        assert_eq!(issue.issue_type, "grammar");
        assert_eq!(issue.position, Position::new(2, 7));
        assert_eq!(issue.status, IssueStatus::Pending);

        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value["type"], "grammar");
        assert_eq!(value["originalText"], "quick");
        assert_eq!(value["recommendedText"], "slow");
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{
            "id": "iss-2",
            "originalText": "a",
            "recommendedText": "b",
            "position": { "start": 0, "end": 1 }
        }"#;

        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.status, IssueStatus::Pending);
        assert!(issue.comment.is_empty());
        assert!(issue.issue_type.is_empty());
    }

    #[test]
    fn test_expected_text_follows_status() {
        let issue = Issue::new("i", "t", "quick", "slowest", "", Position::new(2, 7));
        assert_eq!(issue.expected_text(), "quick");
        assert_eq!(issue.expected_position(), Position::new(2, 7));

        let applied = issue.with_status(IssueStatus::Applied);
        assert_eq!(applied.expected_text(), "slowest");
        assert_eq!(applied.expected_position(), Position::new(2, 9));
    }

    #[test]
    fn test_position_shifted() {
        let pos = Position::new(2, 7);
        assert_eq!(pos.shifted(3), Position::new(5, 10));
        assert_eq!(pos.shifted(-5), Position::new(0, 2));
        assert_eq!(pos.len(), 5);
        assert!(Position::new(4, 4).is_empty());
        assert!(Position::new(5, 4).is_empty());
    }

    #[test]
    fn test_status_terminal() {
        assert!(IssueStatus::Applied.is_terminal());
        assert!(IssueStatus::Rejected.is_terminal());
        assert!(!IssueStatus::Failed.is_terminal());
        assert_eq!(IssueStatus::Applying.to_string(), "applying");
    }
}
