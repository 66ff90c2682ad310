/// 变更追踪模块
///
/// 记录每个已应用问题的前后文本，便于审计和导出修订稿。
/// `TrackedChange` 创建后不可修改，只能通过访问器读取。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::issue_types::{Issue, IssueStatus, Position};
use crate::locator::ResolvedSpan;
use crate::utils::preview_text;

/// 单个问题的变更记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedChange {
    id: String,
    #[serde(rename = "type")]
    issue_type: String,
    original_text: String,
    new_text: String,
    comment: String,
    /// 已应用：在 `revision` 版本正文中解析出的区间；预览：问题记录的位置
    position: Position,
    status: IssueStatus,
    /// 应用时正文的版本号（同一批次的变更相同）
    #[serde(default)]
    revision: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TrackedChange {
    /// 由应用成功的问题生成记录
    ///
    /// # 参数
    /// * `issue` - 被应用的问题
    /// * `span` - 在批次快照中解析出的区间
    pub fn applied(issue: &Issue, span: ResolvedSpan) -> Self {
        let now = Utc::now();
        Self {
            id: issue.id.clone(),
            issue_type: issue.issue_type.clone(),
            original_text: issue.original_text.clone(),
            new_text: issue.recommended_text.clone(),
            comment: issue.comment.clone(),
            position: span.into(),
            status: IssueStatus::Applied,
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// 由尚未应用的问题生成预览记录（状态沿用问题状态）
    pub fn preview(issue: &Issue) -> Self {
        let now = Utc::now();
        Self {
            id: issue.id.clone(),
            issue_type: issue.issue_type.clone(),
            original_text: issue.original_text.clone(),
            new_text: issue.recommended_text.clone(),
            comment: issue.comment.clone(),
            position: issue.position,
            status: issue.status,
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// 标记应用时的正文版本
    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn issue_type(&self) -> &str {
        &self.issue_type
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn new_text(&self) -> &str {
        &self.new_text
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn status(&self) -> IssueStatus {
        self.status
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl std::fmt::Display for TrackedChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} {}: \"{}\" -> \"{}\"",
            self.id,
            self.status,
            self.position,
            preview_text(&self.original_text, 30),
            preview_text(&self.new_text, 30)
        )
    }
}

/// 会话内的变更日志
///
/// # 实现细节
/// - 只追加，按应用顺序保存
/// - 不跨会话持久化（由宿主应用负责）
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    changes: Vec<TrackedChange>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条变更
    pub fn record(&mut self, change: TrackedChange) {
        self.changes.push(change);
    }

    /// 批量追加
    pub fn record_all(&mut self, changes: impl IntoIterator<Item = TrackedChange>) {
        self.changes.extend(changes);
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// 按应用顺序迭代
    pub fn iter(&self) -> impl Iterator<Item = &TrackedChange> {
        self.changes.iter()
    }

    pub fn all_changes(&self) -> &[TrackedChange] {
        &self.changes
    }

    /// 获取特定问题的变更
    pub fn for_issue(&self, issue_id: &str) -> Option<&TrackedChange> {
        self.changes.iter().find(|c| c.id == issue_id)
    }

    /// 生成变更摘要
    pub fn summary(&self) -> String {
        let inserted: usize = self.changes.iter().map(|c| c.new_text.chars().count()).sum();
        let removed: usize = self.changes.iter().map(|c| c.original_text.chars().count()).sum();
        format!(
            "变更总数: {}, 删除字符: {}, 插入字符: {}",
            self.changes.len(),
            removed,
            inserted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_issue(id: &str, old: &str, new: &str) -> Issue {
        Issue::new(id, "wording", old, new, "note", Position::new(0, old.chars().count()))
    }

    #[test]
    fn test_applied_change_fields() {
        let issue = create_test_issue("a", "quick", "slow");
        let change = TrackedChange::applied(&issue, ResolvedSpan::new(2, 7));

        assert_eq!(change.id(), "a");
        assert_eq!(change.issue_type(), "wording");
        assert_eq!(change.original_text(), "quick");
        assert_eq!(change.new_text(), "slow");
        assert_eq!(change.comment(), "note");
        assert_eq!(change.position(), Position::new(2, 7));
        assert_eq!(change.status(), IssueStatus::Applied);
        assert_eq!(change.revision(), 0);
        assert_eq!(change.created_at(), change.updated_at());
        assert_eq!(change.with_revision(3).revision(), 3);
    }

    #[test]
    fn test_preview_keeps_issue_status() {
        let issue = create_test_issue("b", "x", "y").with_status(IssueStatus::Rejected);
        let change = TrackedChange::preview(&issue);
        assert_eq!(change.status(), IssueStatus::Rejected);
        assert_eq!(change.position(), Position::new(0, 1));
    }

    #[test]
    fn test_change_log() {
        let mut log = ChangeLog::new();
        assert!(log.is_empty());

        log.record(TrackedChange::applied(&create_test_issue("a", "ab", "c"), ResolvedSpan::new(0, 2)));
        log.record_all(vec![TrackedChange::applied(
            &create_test_issue("b", "d", "efg"),
            ResolvedSpan::new(5, 6),
        )]);

        assert_eq!(log.len(), 2);
        assert_eq!(log.for_issue("b").unwrap().new_text(), "efg");
        assert!(log.for_issue("z").is_none());

        let ids: Vec<&str> = log.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let summary = log.summary();
        assert!(summary.contains("变更总数: 2"));
        assert!(summary.contains("删除字符: 3"));
        assert!(summary.contains("插入字符: 4"));
    }

    #[test]
    fn test_serialized_wire_shape() {
        let change = TrackedChange::applied(&create_test_issue("a", "quick", "slow"), ResolvedSpan::new(2, 7));
        let value = serde_json::to_value(&change).unwrap();

        assert_eq!(value["type"], "wording");
        assert_eq!(value["newText"], "slow");
        assert_eq!(value["status"], "applied");
        assert!(value["createdAt"].is_string());
    }

    #[test]
    fn test_display() {
        let change = TrackedChange::applied(&create_test_issue("a", "quick", "slow"), ResolvedSpan::new(2, 7));
        assert_eq!(change.to_string(), "[a] applied [2, 7): \"quick\" -> \"slow\"");
    }
}
