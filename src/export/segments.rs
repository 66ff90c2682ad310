/// 修订稿分段
///
/// 把基线内容与变更列表合并为有序分段：未修改文本原样通过，已应用的变更显示新文本，
/// 待处理的变更同时给出删除线原文与建议文本，已拒绝的变更不参与渲染。
///
/// 已应用的变更按 `revision` 分批重放：批内位置都相对于该批开始前的正文，
/// 因此重放结果与编辑器当前内容一致。落在先前插入文本内的变更会与之合并为一段。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::editor::TrackedChange;
use crate::issue_types::{IssueStatus, Position};
use crate::locator::{self, ResolvedSpan};
use crate::text_index;

/// 修订稿中的一段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Segment {
    /// 未修改的文本
    Unchanged { text: String },
    /// 已应用的变更
    #[serde(rename_all = "camelCase")]
    Inserted {
        id: String,
        /// 这一段替换掉的基线原文
        original: String,
        text: String,
        comment: String,
        /// 被本段合并的更早变更
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        merged: Vec<String>,
    },
    /// 尚未应用的建议
    #[serde(rename_all = "camelCase")]
    Proposed {
        id: String,
        status: IssueStatus,
        original: String,
        proposed: String,
        comment: String,
    },
}

impl Segment {
    /// 渲染后用户看到的正文（建议取原文）
    pub fn visible_text(&self) -> &str {
        match self {
            Segment::Unchanged { text } => text,
            Segment::Inserted { text, .. } => text,
            Segment::Proposed { original, .. } => original,
        }
    }
}

/// 已应用变更在当前正文中的区间；被后续变更合并的为 `None`
pub type AppliedSpans = BTreeMap<String, Option<ResolvedSpan>>;

/// 被替换区间覆盖的内容
#[derive(Debug, Default)]
struct Covered {
    /// 覆盖部分对应的基线原文
    original: String,
    /// 被合并的插入段中位于区间之前的文本
    prefix: String,
    /// 被合并的插入段中位于区间之后的文本
    suffix: String,
    merged: Vec<String>,
    comments: Vec<String>,
}

/// 构建修订稿分段
///
/// # 行为
/// - 已应用的变更按版本分批重放，位置失效时在该批之前的正文中回退搜索
/// - 预览变更在重放后的正文中定位，与插入段或彼此重叠的跳过
/// - 找不到的、批内重叠的、ID 重复的变更跳过并记录日志
pub fn build_segments(baseline: &str, changes: &[TrackedChange]) -> Vec<Segment> {
    let mut pieces = replay_applied(baseline, changes);
    add_proposals(&mut pieces, changes);
    pieces
}

/// 计算已应用变更在当前正文中的区间
pub fn applied_spans(baseline: &str, changes: &[TrackedChange]) -> AppliedSpans {
    let mut spans = AppliedSpans::new();
    let mut cursor = 0usize;

    for piece in replay_applied(baseline, changes) {
        let len = text_index::char_len(piece.visible_text());
        if let Segment::Inserted { id, merged, .. } = piece {
            for absorbed in merged {
                spans.insert(absorbed, None);
            }
            spans.insert(id, (len > 0).then(|| ResolvedSpan::new(cursor, cursor + len)));
        }
        cursor += len;
    }

    spans
}

/// 由分段还原应用后的正文（已应用取新文本，建议保持原文）
pub fn render_plain(segments: &[Segment]) -> String {
    segments.iter().map(Segment::visible_text).collect()
}

fn replay_applied(baseline: &str, changes: &[TrackedChange]) -> Vec<Segment> {
    let mut applied: Vec<&TrackedChange> = Vec::new();
    for change in changes.iter().filter(|c| c.status() == IssueStatus::Applied) {
        if applied.iter().any(|c| c.id() == change.id()) {
            log::warn!("导出跳过: 重复的变更 {}", change.id());
            continue;
        }
        applied.push(change);
    }
    applied.sort_by_key(|c| c.revision());

    let mut pieces = Vec::new();
    if !baseline.is_empty() {
        pieces.push(Segment::Unchanged {
            text: baseline.to_string(),
        });
    }

    let mut rest = applied.as_slice();
    while let Some(first) = rest.first() {
        let batch_len = rest
            .iter()
            .take_while(|c| c.revision() == first.revision())
            .count();
        let (batch, tail) = rest.split_at(batch_len);
        replay_batch(&mut pieces, batch);
        rest = tail;
    }

    pieces
}

/// 重放同一版本的一批变更：先在批前正文上全部定位，再按起点倒序拼接
fn replay_batch(pieces: &mut Vec<Segment>, batch: &[&TrackedChange]) {
    let current = render_plain(pieces);

    let mut located: Vec<(ResolvedSpan, &TrackedChange)> = Vec::new();
    for change in batch {
        match locator::locate_text(&current, change.original_text(), change.position()) {
            Some(l) => located.push((l.span, *change)),
            None => log::warn!(
                "导出跳过: 变更 {} 的原文不在版本 {} 的正文中",
                change.id(),
                change.revision()
            ),
        }
    }

    located.sort_by_key(|(span, _)| span.start);
    let kept = drop_overlapping(located);

    for (span, change) in kept.into_iter().rev() {
        splice(pieces, span, |covered| {
            let mut text = covered.prefix;
            text.push_str(change.new_text());
            text.push_str(&covered.suffix);

            let mut comments = covered.comments;
            if !change.comment().is_empty() {
                comments.push(change.comment().to_string());
            }

            Segment::Inserted {
                id: change.id().to_string(),
                original: covered.original,
                text,
                comment: comments.join("; "),
                merged: covered.merged,
            }
        });
    }
}

/// 把预览变更作为建议段插入
fn add_proposals(pieces: &mut Vec<Segment>, changes: &[TrackedChange]) {
    let current = render_plain(pieces);
    let applied_ids: Vec<&str> = changes
        .iter()
        .filter(|c| c.status() == IssueStatus::Applied)
        .map(|c| c.id())
        .collect();

    let mut located: Vec<(ResolvedSpan, &TrackedChange)> = Vec::new();
    for change in changes {
        if matches!(change.status(), IssueStatus::Applied | IssueStatus::Rejected) {
            continue;
        }
        if applied_ids.contains(&change.id()) || located.iter().any(|(_, c)| c.id() == change.id()) {
            log::warn!("导出跳过: 重复的变更 {}", change.id());
            continue;
        }
        match locator::locate_text(&current, change.original_text(), change.position()) {
            Some(l) if touches_inserted(pieces, l.span) => {
                log::warn!("导出跳过: 建议 {} 与已应用的变更重叠", change.id())
            }
            Some(l) => located.push((l.span, change)),
            None => log::warn!("导出跳过: 建议 {} 的原文不在当前正文中", change.id()),
        }
    }

    located.sort_by_key(|(span, _)| span.start);
    let kept = drop_overlapping(located);

    for (span, change) in kept.into_iter().rev() {
        splice(pieces, span, |covered| Segment::Proposed {
            id: change.id().to_string(),
            status: change.status(),
            original: covered.original,
            proposed: change.new_text().to_string(),
            comment: change.comment().to_string(),
        });
    }
}

/// 按起点排好序的区间中剔除与前一个保留区间重叠的
fn drop_overlapping<'a>(
    located: Vec<(ResolvedSpan, &'a TrackedChange)>,
) -> Vec<(ResolvedSpan, &'a TrackedChange)> {
    let mut kept: Vec<(ResolvedSpan, &TrackedChange)> = Vec::with_capacity(located.len());
    for (span, change) in located {
        if let Some((previous, _)) = kept.last() {
            if span.start < previous.end {
                log::warn!("导出跳过: 变更 {} 与前一个变更重叠", change.id());
                continue;
            }
        }
        kept.push((span, change));
    }
    kept
}

/// 分段是否与区间相交；空分段只在严格落入区间内部时算相交
fn intersects(start: usize, len: usize, span: ResolvedSpan) -> bool {
    if len == 0 {
        span.start < start && start < span.end
    } else {
        start < span.end && span.start < start + len
    }
}

fn touches_inserted(pieces: &[Segment], span: ResolvedSpan) -> bool {
    let mut cursor = 0usize;
    for piece in pieces {
        let len = text_index::char_len(piece.visible_text());
        if matches!(piece, Segment::Inserted { .. }) && intersects(cursor, len, span) {
            return true;
        }
        cursor += len;
    }
    false
}

/// 用 `build` 生成的分段替换当前正文中的 `[span.start, span.end)`
///
/// 部分覆盖的未修改段在边界处切开；部分覆盖的插入段整体并入新段。
fn splice(pieces: &mut Vec<Segment>, span: ResolvedSpan, build: impl FnOnce(Covered) -> Segment) {
    let mut before = Vec::new();
    let mut after = Vec::new();
    let mut head = None;
    let mut tail = None;
    let mut covered = Covered::default();

    let mut cursor = 0usize;
    for piece in pieces.drain(..) {
        let len = text_index::char_len(piece.visible_text());
        let piece_start = cursor;
        cursor += len;

        if !intersects(piece_start, len, span) {
            if piece_start + len <= span.start {
                before.push(piece);
            } else {
                after.push(piece);
            }
            continue;
        }

        let local_start = span.start.saturating_sub(piece_start);
        let local_end = span.end.min(piece_start + len) - piece_start;
        let text = piece.visible_text();
        let lead = text_index::slice(text, Position::new(0, local_start)).to_string();
        let inside = text_index::slice(text, Position::new(local_start, local_end)).to_string();
        let trail = text_index::slice(text, Position::new(local_end, len)).to_string();

        match piece {
            Segment::Inserted {
                id,
                original,
                comment,
                merged,
                ..
            } => {
                covered.prefix.push_str(&lead);
                covered.suffix.push_str(&trail);
                covered.original.push_str(&original);
                covered.merged.extend(merged);
                covered.merged.push(id);
                if !comment.is_empty() {
                    covered.comments.push(comment);
                }
            }
            _ => {
                if !lead.is_empty() {
                    head = Some(Segment::Unchanged { text: lead });
                }
                covered.original.push_str(&inside);
                if !trail.is_empty() {
                    tail = Some(Segment::Unchanged { text: trail });
                }
            }
        }
    }

    pieces.extend(before);
    pieces.extend(head);
    pieces.push(build(covered));
    pieces.extend(tail);
    pieces.extend(after);
}
