/// 区间定位模块
///
/// 在当前内容中解析问题原文所在的区间，容忍记录偏移的漂移：
/// 1. 先信任记录的位置（夹到内容范围内后比对文本）
/// 2. 不匹配时退化为字面子串搜索，取第一个匹配
/// 3. 原文为空或搜索不到时返回 `None`（不是错误，由调用方按问题逐个处理）

use serde::{Deserialize, Serialize};

use crate::issue_types::{Issue, Position};
use crate::text_index;

/// 已解析区间（字符偏移），保证 `content[start..end] == 期望文本`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedSpan {
    pub start: usize,
    pub end: usize,
}

impl ResolvedSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// 半开区间是否相交（相邻不算重叠）
    pub fn overlaps(&self, previous: &ResolvedSpan) -> bool {
        self.start < previous.end && previous.start < self.end
    }

    pub fn as_position(&self) -> Position {
        Position::new(self.start, self.end)
    }
}

impl From<ResolvedSpan> for Position {
    fn from(span: ResolvedSpan) -> Self {
        span.as_position()
    }
}

/// 定位方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LocateMethod {
    /// 记录的位置仍然有效
    FastPath,
    /// 通过子串搜索找到
    Search,
}

/// 定位结果（含定位方式，便于诊断）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located {
    pub span: ResolvedSpan,
    pub method: LocateMethod,
}

/// 定位问题原文
pub fn locate(content: &str, issue: &Issue) -> Option<ResolvedSpan> {
    locate_with_method(content, issue).map(|located| located.span)
}

/// 定位问题原文，并返回定位方式
pub fn locate_with_method(content: &str, issue: &Issue) -> Option<Located> {
    let located = locate_text(content, &issue.original_text, issue.position);

    match &located {
        Some(l) => {
            log::debug!(
                "问题 {} 定位成功: [{}, {}) via {:?}",
                issue.id,
                l.span.start,
                l.span.end,
                l.method
            );
            // 搜索路径取第一个匹配，原文多次出现时可能选错
            if l.method == LocateMethod::Search && log::log_enabled!(log::Level::Debug) {
                let occurrences = find_all(content, &issue.original_text).len();
                if occurrences > 1 {
                    log::debug!("问题 {} 的原文出现 {} 次，已取第一个", issue.id, occurrences);
                }
            }
        }
        None => log::debug!("问题 {} 未能定位原文", issue.id),
    }

    located
}

/// 核心定位算法：按位置提示查找 `text`
pub fn locate_text(content: &str, text: &str, hint: Position) -> Option<Located> {
    if text.is_empty() {
        return None;
    }

    // 快速路径：夹紧后的区间非空且文本一致
    let clamped = text_index::clamp(content, hint);
    if clamped.start < clamped.end && text_index::slice(content, clamped) == text {
        return Some(Located {
            span: ResolvedSpan::new(clamped.start, clamped.end),
            method: LocateMethod::FastPath,
        });
    }

    // 回退：字面子串搜索，取第一个匹配
    let byte_start = content.find(text)?;
    let start = text_index::byte_to_char(content, byte_start);
    Some(Located {
        span: ResolvedSpan::new(start, start + text_index::char_len(text)),
        method: LocateMethod::Search,
    })
}

/// 查找 `text` 的所有（不重叠）出现位置
pub fn find_all(content: &str, text: &str) -> Vec<ResolvedSpan> {
    if text.is_empty() {
        return Vec::new();
    }

    let text_len = text_index::char_len(text);
    content
        .match_indices(text)
        .map(|(byte_start, _)| {
            let start = text_index::byte_to_char(content, byte_start);
            ResolvedSpan::new(start, start + text_len)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(original: &str, start: usize, end: usize) -> Issue {
        Issue::new("i1", "style", original, "x", "", Position::new(start, end))
    }

    #[test]
    fn test_exact_position_is_returned() {
        let content = "A quick fox.";
        let located = locate_with_method(content, &issue("quick", 2, 7)).unwrap();
        assert_eq!(located.span, ResolvedSpan::new(2, 7));
        assert_eq!(located.method, LocateMethod::FastPath);
    }

    #[test]
    fn test_stale_position_falls_back_to_search() {
        let content = "A quick fox.";
        let located = locate_with_method(content, &issue("quick", 5, 10)).unwrap();
        assert_eq!(located.span, ResolvedSpan::new(2, 7));
        assert_eq!(located.method, LocateMethod::Search);
    }

    #[test]
    fn test_out_of_range_position_is_clamped() {
        let content = "A quick fox.";
        // 夹紧后为空区间，走搜索
        assert_eq!(locate(content, &issue("fox", 50, 60)), Some(ResolvedSpan::new(8, 11)));
        // 夹紧后恰好匹配末尾
        assert_eq!(locate(content, &issue("fox.", 8, 99)), Some(ResolvedSpan::new(8, 12)));
    }

    #[test]
    fn test_not_found() {
        let content = "A quick fox.";
        assert_eq!(locate(content, &issue("wolf", 2, 6)), None);
        // 重复调用结果一致
        assert_eq!(locate(content, &issue("wolf", 2, 6)), None);
    }

    #[test]
    fn test_empty_original_is_not_found() {
        let content = "A quick fox.";
        assert_eq!(locate(content, &issue("", 2, 2)), None);
        assert_eq!(locate(content, &issue("", 2, 7)), None);
    }

    #[test]
    fn test_duplicate_text_uses_first_occurrence() {
        let content = "the cat and the dog";
        // 记录位置不匹配任何出现：取第一个
        assert_eq!(locate(content, &issue("the", 1, 4)), Some(ResolvedSpan::new(0, 3)));
        // 记录位置恰好是第二个出现：快速路径保留
        assert_eq!(locate(content, &issue("the", 12, 15)), Some(ResolvedSpan::new(12, 15)));
    }

    #[test]
    fn test_multibyte_content() {
        let content = "本合同自双方签字之日起生效。";
        assert_eq!(locate(content, &issue("签字", 4, 6)), Some(ResolvedSpan::new(4, 6)));
        assert_eq!(locate(content, &issue("生效", 0, 2)), Some(ResolvedSpan::new(11, 13)));
    }

    #[test]
    fn test_find_all() {
        let content = "aa bb aa cc aa";
        let spans = find_all(content, "aa");
        assert_eq!(
            spans,
            vec![
                ResolvedSpan::new(0, 2),
                ResolvedSpan::new(6, 8),
                ResolvedSpan::new(12, 14)
            ]
        );
        assert!(find_all(content, "").is_empty());
    }

    #[test]
    fn test_overlaps() {
        let a = ResolvedSpan::new(2, 7);
        assert!(ResolvedSpan::new(5, 9).overlaps(&a));
        assert!(!ResolvedSpan::new(7, 9).overlaps(&a));
        assert!(ResolvedSpan::new(3, 4).overlaps(&a));
    }
}
