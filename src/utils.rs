use thiserror::Error;

use crate::issue_types::IssueStatus;

/// 自定义错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Span not found for issue {issue_id}")]
    SpanNotFound { issue_id: String },

    #[error("Span of issue {issue_id} overlaps issue {with}")]
    SpanConflict { issue_id: String, with: String },

    #[error("Unsupported source format: {0}")]
    UnsupportedSourceFormat(String),

    #[error("Unknown text encoding: {0}")]
    InvalidEncoding(String),

    #[error("Download expired: {0}")]
    DownloadExpired(String),

    #[error("Unknown download handle: {0}")]
    UnknownDownload(String),

    #[error("Unknown issue: {0}")]
    UnknownIssue(String),

    #[error("Invalid status transition for issue {issue_id}: {from} -> {to}")]
    InvalidTransition {
        issue_id: String,
        from: IssueStatus,
        to: IssueStatus,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// 截断预览文本（按字符计数，避免切断多字节字符）
pub fn preview_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

/// HTML 转义
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// 将任意名称转换为安全的文件名主干
pub fn sanitize_file_stem(stem: &str) -> String {
    let cleaned: String = stem
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "document".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_text() {
        assert_eq!(preview_text("short", 10), "short");
        assert_eq!(preview_text("abcdefghij", 3), "abc...");
        // 多字节字符按字符截断
        assert_eq!(preview_text("这是一个很长的句子", 4), "这是一个...");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b & c > \"d\""), "a &lt; b &amp; c &gt; &quot;d&quot;");
        assert_eq!(escape_html("it's"), "it&#39;s");
        assert_eq!(escape_html("普通文本"), "普通文本");
    }

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("report v2"), "report_v2");
        assert_eq!(sanitize_file_stem("合同-final"), "合同-final");
        assert_eq!(sanitize_file_stem("  "), "document");
        assert_eq!(sanitize_file_stem("../etc/passwd"), "___etc_passwd");
    }

    #[test]
    fn test_error_display() {
        let err = EngineError::InvalidTransition {
            issue_id: "i1".to_string(),
            from: IssueStatus::Applied,
            to: IssueStatus::Pending,
        };
        assert_eq!(
            err.to_string(),
            "Invalid status transition for issue i1: applied -> pending"
        );
    }
}
