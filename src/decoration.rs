/// 高亮装饰构建模块
///
/// 纯函数：`(content, issues) -> DecorationSet`。每次内容或问题状态变化后整体重算，
/// 不做缓存也不做增量修补。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::export::AppliedSpans;
use crate::issue_types::{Issue, IssueStatus};
use crate::locator::{self, ResolvedSpan};
use crate::text_index;

/// 高亮样式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecorationStyle {
    Pending,
    Applying,
    Applied,
    Failed,
}

impl DecorationStyle {
    /// 由问题状态推导样式；已拒绝的问题不显示
    pub fn from_status(status: IssueStatus) -> Option<Self> {
        match status {
            IssueStatus::Pending => Some(DecorationStyle::Pending),
            IssueStatus::Applying => Some(DecorationStyle::Applying),
            IssueStatus::Applied => Some(DecorationStyle::Applied),
            IssueStatus::Failed => Some(DecorationStyle::Failed),
            IssueStatus::Rejected => None,
        }
    }

    /// 样式对应的 CSS 类名
    pub fn css_class<'a>(&self, config: &'a EngineConfig) -> &'a str {
        match self {
            DecorationStyle::Pending => &config.pending_class,
            DecorationStyle::Applying => &config.applying_class,
            DecorationStyle::Applied => &config.applied_class,
            DecorationStyle::Failed => &config.failed_class,
        }
    }
}

/// 单个高亮区间
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decoration {
    pub issue_id: String,
    pub span: ResolvedSpan,
    pub style: DecorationStyle,
}

/// 高亮集合：问题 ID -> 高亮区间，区间互不重叠
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecorationSet {
    decorations: BTreeMap<String, Decoration>,
}

impl DecorationSet {
    pub fn len(&self) -> usize {
        self.decorations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }

    pub fn get(&self, issue_id: &str) -> Option<&Decoration> {
        self.decorations.get(issue_id)
    }

    pub fn contains(&self, issue_id: &str) -> bool {
        self.decorations.contains_key(issue_id)
    }

    /// 按起点排序的高亮列表（渲染顺序）
    pub fn iter_sorted(&self) -> Vec<&Decoration> {
        let mut sorted: Vec<&Decoration> = self.decorations.values().collect();
        sorted.sort_by_key(|d| (d.span.start, d.span.end));
        sorted
    }
}

/// 构建高亮集合
///
/// # 行为
/// - 跳过已拒绝的问题
/// - 已应用的问题按建议文本定位（原文已不在内容中）
/// - 找不到的问题静默省略（仅记录日志）
/// - 重叠区间只保留起点最小的一个
pub fn build_decorations(content: &str, issues: &[Issue]) -> DecorationSet {
    build_decorations_with_spans(content, issues, &AppliedSpans::new())
}

/// 构建高亮集合，已应用问题优先使用变更日志映射出的区间
///
/// `applied` 由 `export::applied_spans` 计算；其中为 `None` 的问题已被后续变更合并，不单独高亮。
/// 不在 `applied` 中的已应用问题退回按建议文本定位。
pub fn build_decorations_with_spans(
    content: &str,
    issues: &[Issue],
    applied: &AppliedSpans,
) -> DecorationSet {
    let mut candidates: Vec<Decoration> = Vec::new();
    let content_len = text_index::char_len(content);

    for issue in issues {
        let Some(style) = DecorationStyle::from_status(issue.status) else {
            continue;
        };

        if issue.status == IssueStatus::Applied {
            match applied.get(&issue.id) {
                Some(Some(span)) if span.end <= content_len => {
                    candidates.push(Decoration {
                        issue_id: issue.id.clone(),
                        span: *span,
                        style,
                    });
                    continue;
                }
                Some(None) => {
                    log::debug!("高亮跳过: 问题 {} 已并入后续变更", issue.id);
                    continue;
                }
                _ => {}
            }
        }

        match locator::locate_text(content, issue.expected_text(), issue.expected_position()) {
            Some(located) => candidates.push(Decoration {
                issue_id: issue.id.clone(),
                span: located.span,
                style,
            }),
            None => log::warn!("高亮跳过: 问题 {} 的文本在当前内容中未找到", issue.id),
        }
    }

    // 稳定排序，起点相同时保留输入顺序
    candidates.sort_by_key(|d| d.span.start);

    let mut set = DecorationSet::default();
    let mut last_end: Option<usize> = None;

    for decoration in candidates {
        if set.contains(&decoration.issue_id) {
            log::warn!("高亮跳过: 重复的问题 ID {}", decoration.issue_id);
            continue;
        }
        if let Some(end) = last_end {
            if decoration.span.start < end {
                log::warn!("高亮跳过: 问题 {} 与已有高亮重叠", decoration.issue_id);
                continue;
            }
        }
        last_end = Some(decoration.span.end);
        set.decorations.insert(decoration.issue_id.clone(), decoration);
    }

    set
}
