/// 修订稿导出模块
///
/// 由基线内容和变更列表生成带修订标记的文档，交给外部存储服务（见 `io`）。
///
/// # 架构设计
///
/// - **segments**: 基线 + 变更 -> 有序分段
/// - **html**: 分段 -> HTML（`<ins>` / `<del>` / 批注）
/// - **json**: 分段 -> 结构化 JSON
mod html;
mod json;
mod segments;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::editor::TrackedChange;
use crate::utils::{sanitize_file_stem, EngineError};

pub use segments::{applied_spans, build_segments, render_plain, AppliedSpans, Segment};

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Html,
    Json,
}

impl ExportFormat {
    /// 获取文件扩展名
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Html => "text/html; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(ExportFormat::Html),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("未知的导出格式: {}", other)),
        }
    }
}

/// 导出产物：不透明字节流 + 建议文件名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
}

/// 生成修订稿
///
/// # 参数
/// * `baseline` - 会话开始时的内容
/// * `changes` - 变更列表（预览模式下包含未应用的问题）
/// * `format` - 导出格式
/// * `name` - 文档名称，用于生成文件名
pub fn serialize(
    baseline: &str,
    changes: &[TrackedChange],
    format: ExportFormat,
    name: &str,
    config: &EngineConfig,
) -> Result<Artifact, EngineError> {
    let segments = build_segments(baseline, changes);

    let bytes = match format {
        ExportFormat::Html => html::render(name, &segments, config).into_bytes(),
        ExportFormat::Json => json::render(name, &segments)?,
    };

    let filename = format!(
        "{}{}.{}",
        sanitize_file_stem(name),
        config.filename_suffix,
        format.extension()
    );

    log::info!("已生成修订稿 {} ({} 字节, {} 段)", filename, bytes.len(), segments.len());

    Ok(Artifact {
        bytes,
        filename,
        mime_type: format.mime_type().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue_types::{Issue, Position};
    use crate::locator::ResolvedSpan;

    #[test]
    fn test_serialize_html_artifact() {
        let issue = Issue::new("a", "t", "quick", "slow", "", Position::new(2, 7));
        let changes = vec![TrackedChange::applied(&issue, ResolvedSpan::new(2, 7))];

        let artifact = serialize(
            "A quick fox.",
            &changes,
            ExportFormat::Html,
            "my report",
            &EngineConfig::default(),
        )
        .unwrap();

        assert_eq!(artifact.filename, "my_report_tracked.html");
        assert_eq!(artifact.mime_type, "text/html; charset=utf-8");
        let html = String::from_utf8(artifact.bytes).unwrap();
        assert!(html.contains(">slow</ins>"));
    }

    #[test]
    fn test_serialize_json_artifact() {
        let artifact = serialize(
            "plain",
            &[],
            ExportFormat::Json,
            "doc",
            &EngineConfig::default(),
        )
        .unwrap();

        assert_eq!(artifact.filename, "doc_tracked.json");
        let value: serde_json::Value = serde_json::from_slice(&artifact.bytes).unwrap();
        assert_eq!(value["segments"][0]["text"], "plain");
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("HTML".parse::<ExportFormat>(), Ok(ExportFormat::Html));
        assert_eq!("json".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert!("docx".parse::<ExportFormat>().is_err());
    }
}
