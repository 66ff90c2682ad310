/// 问题状态追踪模块
///
/// 每个问题一个小状态机：
///
/// ```text
/// pending -> applying -> applied   (终态)
/// pending -> rejected              (终态)
/// applying -> failed -> pending    (允许重试)
/// ```
///
/// 追踪器只决定哪些问题 ID 可以进入下一批应用，本身不锁定内容。

use std::collections::HashMap;

use serde::Serialize;

use crate::issue_types::{Issue, IssueStatus};
use crate::utils::EngineError;

/// 问题状态追踪器
#[derive(Debug, Clone, Default)]
pub struct IssueStatusTracker {
    statuses: HashMap<String, IssueStatus>,
}

/// 各状态的问题数量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub applying: usize,
    pub applied: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl IssueStatusTracker {
    /// 以问题自带的状态初始化
    pub fn from_issues(issues: &[Issue]) -> Self {
        let statuses = issues
            .iter()
            .map(|issue| (issue.id.clone(), issue.status))
            .collect();
        Self { statuses }
    }

    /// 状态迁移是否合法
    pub fn can_transition(from: IssueStatus, to: IssueStatus) -> bool {
        matches!(
            (from, to),
            (IssueStatus::Pending, IssueStatus::Applying)
                | (IssueStatus::Pending, IssueStatus::Rejected)
                | (IssueStatus::Applying, IssueStatus::Applied)
                | (IssueStatus::Applying, IssueStatus::Failed)
                | (IssueStatus::Failed, IssueStatus::Pending)
        )
    }

    pub fn status_of(&self, issue_id: &str) -> Option<IssueStatus> {
        self.statuses.get(issue_id).copied()
    }

    /// 执行状态迁移
    ///
    /// # 返回
    /// 返回迁移前的状态；未知 ID 或非法迁移返回错误且不改变状态
    pub fn transition(&mut self, issue_id: &str, to: IssueStatus) -> Result<IssueStatus, EngineError> {
        let current = self
            .statuses
            .get_mut(issue_id)
            .ok_or_else(|| EngineError::UnknownIssue(issue_id.to_string()))?;

        let from = *current;
        if !Self::can_transition(from, to) {
            return Err(EngineError::InvalidTransition {
                issue_id: issue_id.to_string(),
                from,
                to,
            });
        }

        *current = to;
        log::debug!("问题 {} 状态: {} -> {}", issue_id, from, to);
        Ok(from)
    }

    pub fn begin_applying(&mut self, issue_id: &str) -> Result<(), EngineError> {
        self.transition(issue_id, IssueStatus::Applying).map(|_| ())
    }

    pub fn mark_applied(&mut self, issue_id: &str) -> Result<(), EngineError> {
        self.transition(issue_id, IssueStatus::Applied).map(|_| ())
    }

    pub fn mark_failed(&mut self, issue_id: &str) -> Result<(), EngineError> {
        self.transition(issue_id, IssueStatus::Failed).map(|_| ())
    }

    pub fn reject(&mut self, issue_id: &str) -> Result<(), EngineError> {
        self.transition(issue_id, IssueStatus::Rejected).map(|_| ())
    }

    pub fn retry(&mut self, issue_id: &str) -> Result<(), EngineError> {
        self.transition(issue_id, IssueStatus::Pending).map(|_| ())
    }

    /// 可以进入下一批应用的问题（仅 pending）
    pub fn eligible<'a>(&self, issues: &'a [Issue]) -> Vec<&'a Issue> {
        issues
            .iter()
            .filter(|issue| self.status_of(&issue.id) == Some(IssueStatus::Pending))
            .collect()
    }

    /// 用追踪器中的状态覆盖问题列表
    pub fn overlay(&self, issues: &[Issue]) -> Vec<Issue> {
        issues
            .iter()
            .map(|issue| {
                let status = self.status_of(&issue.id).unwrap_or(issue.status);
                issue.clone().with_status(status)
            })
            .collect()
    }

    /// 统计各状态数量
    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for status in self.statuses.values() {
            match status {
                IssueStatus::Pending => counts.pending += 1,
                IssueStatus::Applying => counts.applying += 1,
                IssueStatus::Applied => counts.applied += 1,
                IssueStatus::Rejected => counts.rejected += 1,
                IssueStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue_types::Position;

    fn issues() -> Vec<Issue> {
        vec![
            Issue::new("a", "t", "x", "y", "", Position::new(0, 1)),
            Issue::new("b", "t", "x", "y", "", Position::new(0, 1)),
            Issue::new("c", "t", "x", "y", "", Position::new(0, 1)).with_status(IssueStatus::Applied),
        ]
    }

    #[test]
    fn test_happy_path() {
        let mut tracker = IssueStatusTracker::from_issues(&issues());

        tracker.begin_applying("a").unwrap();
        assert_eq!(tracker.status_of("a"), Some(IssueStatus::Applying));
        tracker.mark_applied("a").unwrap();
        assert_eq!(tracker.status_of("a"), Some(IssueStatus::Applied));
    }

    #[test]
    fn test_failed_can_retry() {
        let mut tracker = IssueStatusTracker::from_issues(&issues());

        tracker.begin_applying("a").unwrap();
        tracker.mark_failed("a").unwrap();
        assert_eq!(tracker.status_of("a"), Some(IssueStatus::Failed));
        tracker.retry("a").unwrap();
        assert_eq!(tracker.status_of("a"), Some(IssueStatus::Pending));
    }

    #[test]
    fn test_terminal_states_are_irreversible() {
        let mut tracker = IssueStatusTracker::from_issues(&issues());

        tracker.reject("b").unwrap();
        assert!(tracker.retry("b").is_err());
        assert!(tracker.begin_applying("b").is_err());

        let err = tracker.begin_applying("c").unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidTransition { from: IssueStatus::Applied, to: IssueStatus::Applying, .. }
        ));
        assert_eq!(tracker.status_of("c"), Some(IssueStatus::Applied));
    }

    #[test]
    fn test_invalid_transitions() {
        let mut tracker = IssueStatusTracker::from_issues(&issues());

        // pending 不能直接 applied / failed
        assert!(tracker.mark_applied("a").is_err());
        assert!(tracker.mark_failed("a").is_err());
        // applying 不能被拒绝
        tracker.begin_applying("a").unwrap();
        assert!(tracker.reject("a").is_err());
        assert!(matches!(tracker.reject("zzz"), Err(EngineError::UnknownIssue(_))));
    }

    #[test]
    fn test_eligible_only_pending() {
        let list = issues();
        let mut tracker = IssueStatusTracker::from_issues(&list);
        tracker.begin_applying("b").unwrap();

        let ids: Vec<&str> = tracker.eligible(&list).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn test_overlay_and_counts() {
        let list = issues();
        let mut tracker = IssueStatusTracker::from_issues(&list);
        tracker.reject("a").unwrap();

        let overlaid = tracker.overlay(&list);
        assert_eq!(overlaid[0].status, IssueStatus::Rejected);
        assert_eq!(overlaid[1].status, IssueStatus::Pending);

        let counts = tracker.counts();
        assert_eq!(counts.rejected, 1);
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.applied, 1);
    }
}
