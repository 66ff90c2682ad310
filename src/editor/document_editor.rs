/// 文档编辑器模块
///
/// 提供有状态的文档编辑接口：持有基线内容、当前内容、问题批次、状态追踪器和变更日志。
/// 每次应用都基于最新内容快照和权威问题列表重新计算，不缓存差异。

use super::applicator::{self, ApplyOutcome};
use super::delta::{ChangeLog, TrackedChange};
use super::stats::EditorStats;
use super::status::IssueStatusTracker;
use crate::config::EngineConfig;
use crate::decoration::{build_decorations_with_spans, DecorationSet};
use crate::export::{self, Artifact, ExportFormat};
use crate::issue_types::{Issue, IssueStatus};
use crate::utils::EngineError;

/// 文档编辑器 - 管理单个文档的编辑会话
///
/// # 核心特性
/// - **批次不可变**: 问题列表在会话开始时给定，只有状态会变化
/// - **可追踪**: 记录所有已应用的变更
/// - **单写者**: 所有修改都需要 `&mut self`，跨线程共享请使用 `SharedDocument`
///
/// # 使用示例
///
/// ```rust,ignore
/// use doc_issue_engine::DocumentEditor;
///
/// let mut editor = DocumentEditor::new("contract", content, issues);
/// let outcome = editor.apply_all()?;
/// println!("{}", outcome.summary());
///
/// let artifact = editor.export(ExportFormat::Html, true)?;
/// ```
#[derive(Debug, Clone)]
pub struct DocumentEditor {
    /// 文档名称（用于导出文件名）
    name: String,
    /// 会话开始时的内容
    baseline: String,
    /// 当前内容
    content: String,
    /// 问题批次（状态以追踪器为准）
    issues: Vec<Issue>,
    /// 状态追踪器
    tracker: IssueStatusTracker,
    /// 变更日志
    changes: ChangeLog,
    /// 内容版本号，每次内容变化递增
    revision: u64,
    config: EngineConfig,
}

impl DocumentEditor {
    /// 创建新的文档编辑器
    ///
    /// # 参数
    /// * `name` - 文档名称
    /// * `content` - 提取出的纯文本内容
    /// * `issues` - 分析服务给出的问题批次
    pub fn new(name: impl Into<String>, content: impl Into<String>, issues: Vec<Issue>) -> Self {
        Self::with_config(name, content, issues, EngineConfig::default())
    }

    /// 使用指定配置创建编辑器
    pub fn with_config(
        name: impl Into<String>,
        content: impl Into<String>,
        issues: Vec<Issue>,
        config: EngineConfig,
    ) -> Self {
        let content = content.into();
        let issues = dedupe_issues(issues);
        let tracker = IssueStatusTracker::from_issues(&issues);
        Self {
            name: name.into(),
            baseline: content.clone(),
            content,
            issues,
            tracker,
            changes: ChangeLog::new(),
            revision: 0,
            config,
        }
    }

    /// 应用单个问题
    ///
    /// # 返回
    /// 问题不存在时返回错误；问题已不是 pending（如已应用）时返回空结果，内容不变
    pub fn apply_issue(&mut self, issue_id: &str) -> Result<ApplyOutcome, EngineError> {
        if self.tracker.status_of(issue_id).is_none() {
            return Err(EngineError::UnknownIssue(issue_id.to_string()));
        }

        let batch: Vec<Issue> = self
            .tracker
            .eligible(&self.issues)
            .into_iter()
            .filter(|issue| issue.id == issue_id)
            .cloned()
            .collect();

        if batch.is_empty() {
            log::debug!("问题 {} 不在可应用状态，忽略", issue_id);
        }

        self.run_batch(batch)
    }

    /// 应用所有待处理的问题
    pub fn apply_all(&mut self) -> Result<ApplyOutcome, EngineError> {
        let batch: Vec<Issue> = self
            .tracker
            .eligible(&self.issues)
            .into_iter()
            .cloned()
            .collect();

        self.run_batch(batch)
    }

    /// 执行一批应用并回写状态
    fn run_batch(&mut self, batch: Vec<Issue>) -> Result<ApplyOutcome, EngineError> {
        if batch.is_empty() {
            return Ok(ApplyOutcome {
                new_content: self.content.clone(),
                ..ApplyOutcome::default()
            });
        }

        for issue in &batch {
            self.tracker.begin_applying(&issue.id)?;
        }

        let mut outcome = applicator::apply(&self.content, &batch);
        let revision = self.revision;
        outcome.applied = outcome
            .applied
            .into_iter()
            .map(|change| change.with_revision(revision))
            .collect();

        for change in &outcome.applied {
            self.tracker.mark_applied(change.id())?;
        }
        for issue_id in outcome.conflicts.iter().chain(outcome.not_found.iter()) {
            self.tracker.mark_failed(issue_id)?;
        }

        if !outcome.applied.is_empty() {
            self.content = outcome.new_content.clone();
            self.revision += 1;
            self.changes.record_all(outcome.applied.iter().cloned());
        }

        Ok(outcome)
    }

    /// 拒绝问题（终态）
    pub fn reject_issue(&mut self, issue_id: &str) -> Result<(), EngineError> {
        self.tracker.reject(issue_id)
    }

    /// 失败的问题重新回到 pending
    pub fn retry_issue(&mut self, issue_id: &str) -> Result<(), EngineError> {
        self.tracker.retry(issue_id)
    }

    /// 所有失败的问题重新回到 pending，返回数量
    pub fn retry_failed(&mut self) -> Result<usize, EngineError> {
        let failed: Vec<String> = self
            .issues
            .iter()
            .filter(|issue| self.tracker.status_of(&issue.id) == Some(IssueStatus::Failed))
            .map(|issue| issue.id.clone())
            .collect();

        for issue_id in &failed {
            self.tracker.retry(issue_id)?;
        }
        Ok(failed.len())
    }

    /// 当前高亮集合（每次调用都整体重算）
    ///
    /// 已应用的问题使用变更日志重放得到的区间，不按建议文本搜索。
    pub fn decorations(&self) -> DecorationSet {
        let applied = export::applied_spans(&self.baseline, self.changes.all_changes());
        build_decorations_with_spans(&self.content, &self.issues(), &applied)
    }

    /// 导出用的变更列表
    ///
    /// # 参数
    /// * `preview` - 为 true 时附加尚未应用的问题（待处理/失败/已拒绝）
    pub fn tracked_changes(&self, preview: bool) -> Vec<TrackedChange> {
        let mut changes: Vec<TrackedChange> = self.changes.iter().cloned().collect();

        if preview {
            changes.extend(
                self.issues()
                    .iter()
                    .filter(|issue| issue.status != IssueStatus::Applied)
                    .map(TrackedChange::preview),
            );
        }

        changes
    }

    /// 导出修订稿
    pub fn export(&self, format: ExportFormat, preview: bool) -> Result<Artifact, EngineError> {
        export::serialize(
            &self.baseline,
            &self.tracked_changes(preview),
            format,
            &self.name,
            &self.config,
        )
    }

    /// 按配置的默认格式导出
    pub fn export_default(&self) -> Result<Artifact, EngineError> {
        self.export(self.config.export_format, self.config.include_pending_in_export)
    }

    /// 问题列表（状态已按追踪器覆盖）
    pub fn issues(&self) -> Vec<Issue> {
        self.tracker.overlay(&self.issues)
    }

    pub fn issue(&self, issue_id: &str) -> Option<Issue> {
        self.issues().into_iter().find(|issue| issue.id == issue_id)
    }

    pub fn status_of(&self, issue_id: &str) -> Option<IssueStatus> {
        self.tracker.status_of(issue_id)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn baseline(&self) -> &str {
        &self.baseline
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn change_log(&self) -> &ChangeLog {
        &self.changes
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 是否有修改
    pub fn is_modified(&self) -> bool {
        !self.changes.is_empty()
    }

    /// 获取统计信息
    pub fn get_stats(&self) -> EditorStats {
        EditorStats {
            name: self.name.clone(),
            revision: self.revision,
            issue_count: self.issues.len(),
            counts: self.tracker.counts(),
            change_count: self.changes.len(),
            baseline_chars: self.baseline.chars().count(),
            content_chars: self.content.chars().count(),
        }
    }
}

/// 去掉 ID 重复的问题（保留第一个）
fn dedupe_issues(issues: Vec<Issue>) -> Vec<Issue> {
    let mut seen = std::collections::HashSet::new();
    issues
        .into_iter()
        .filter(|issue| {
            let first = seen.insert(issue.id.clone());
            if !first {
                log::warn!("忽略重复的问题 ID: {}", issue.id);
            }
            first
        })
        .collect()
}
