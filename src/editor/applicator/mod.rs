/// 问题应用模块
///
/// 把一批问题应用到内容上，返回新内容与实际变更记录。
///
/// # 算法
/// 1. **批量解析**：所有问题都在未修改的快照上定位，找不到的进入 `not_found`
/// 2. **冲突检测**：按起点排序，与上一个保留区间重叠（`start < previous.end`）的进入 `conflicts`
/// 3. **倒序应用**：按起点从大到小拼接，保证尚未处理的（更靠前的）区间不受长度变化影响
/// 4. 为每个成功应用的问题生成 `TrackedChange`
///
/// 单个问题失败不会中断整批（部分成功语义）。

use std::collections::BTreeMap;

use serde::Serialize;

use super::delta::TrackedChange;
use crate::issue_types::Issue;
use crate::locator::{self, ResolvedSpan};
use crate::text_index;
use crate::utils::EngineError;


/// 应用结果
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOutcome {
    /// 应用后的内容
    pub new_content: String,
    /// 成功应用的变更（按位置升序）
    pub applied: Vec<TrackedChange>,
    /// 因区间重叠被跳过的问题 ID
    pub conflicts: Vec<String>,
    /// 冲突问题 -> 被保留的问题 ID
    pub conflicting_with: BTreeMap<String, String>,
    /// 原文未找到的问题 ID
    pub not_found: Vec<String>,
}

impl ApplyOutcome {
    /// 是否所有问题都已应用
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty() && self.not_found.is_empty()
    }

    /// 被跳过的问题数量
    pub fn skipped_count(&self) -> usize {
        self.conflicts.len() + self.not_found.len()
    }

    /// 把逐个问题的失败转换为错误值
    pub fn issue_errors(&self) -> Vec<EngineError> {
        let not_found = self.not_found.iter().map(|id| EngineError::SpanNotFound {
            issue_id: id.clone(),
        });
        let conflicts = self.conflicts.iter().map(|id| EngineError::SpanConflict {
            issue_id: id.clone(),
            with: self.conflicting_with.get(id).cloned().unwrap_or_default(),
        });
        not_found.chain(conflicts).collect()
    }

    /// 生成结果摘要
    pub fn summary(&self) -> String {
        format!(
            "已应用: {}, 冲突: {}, 未找到: {}",
            self.applied.len(),
            self.conflicts.len(),
            self.not_found.len()
        )
    }
}

/// 批量应用问题
///
/// # 参数
/// * `content` - 最新的内容快照
/// * `issues` - 要应用的问题（调用方负责用状态追踪器过滤）
pub fn apply<'a, I>(content: &str, issues: I) -> ApplyOutcome
where
    I: IntoIterator<Item = &'a Issue>,
{
    let mut outcome = ApplyOutcome::default();

    // 第一步：在未修改的快照上批量解析
    let mut resolved: Vec<(&Issue, ResolvedSpan)> = Vec::new();
    for issue in issues {
        match locator::locate(content, issue) {
            Some(span) => resolved.push((issue, span)),
            None => {
                log::warn!("问题 {} 的原文未找到，跳过", issue.id);
                outcome.not_found.push(issue.id.clone());
            }
        }
    }

    // 第二步：按起点排序（稳定排序，起点相同时保留输入顺序），剔除重叠区间
    resolved.sort_by_key(|(_, span)| span.start);

    let mut kept: Vec<(&Issue, ResolvedSpan)> = Vec::with_capacity(resolved.len());
    for (issue, span) in resolved {
        if let Some((previous, previous_span)) = kept.last() {
            if span.start < previous_span.end {
                log::warn!(
                    "问题 {} 的区间 [{}, {}) 与问题 {} 重叠，跳过",
                    issue.id,
                    span.start,
                    span.end,
                    previous.id
                );
                outcome.conflicts.push(issue.id.clone());
                outcome
                    .conflicting_with
                    .insert(issue.id.clone(), previous.id.clone());
                continue;
            }
        }
        kept.push((issue, span));
    }

    // 第三步：倒序拼接；字节区间都基于原始快照计算
    let byte_ranges: Vec<std::ops::Range<usize>> = kept
        .iter()
        .map(|(_, span)| text_index::byte_range(content, span.as_position()))
        .collect();

    let mut new_content = content.to_string();
    for ((issue, _), range) in kept.iter().zip(byte_ranges).rev() {
        new_content.replace_range(range, &issue.recommended_text);
    }

    // 第四步：生成变更记录
    outcome.applied = kept
        .iter()
        .map(|(issue, span)| TrackedChange::applied(issue, *span))
        .collect();
    outcome.new_content = new_content;

    log::info!("批量应用完成 - {}", outcome.summary());
    outcome
}
