/// 纯文本提取实现
///
/// 只处理本身就是文本的格式（纯文本、Markdown、HTML 源码），按 `charset` 参数解码；
/// 二进制格式（docx、pdf 等）的转换属于外部服务。
use std::path::Path;

use super::traits::TextExtractor;
use crate::utils::EngineError;

/// 支持的 MIME 类型
pub const SUPPORTED_MIME_TYPES: &[&str] = &["text/plain", "text/markdown", "text/x-markdown", "text/html"];

/// 默认的纯文本提取器
#[derive(Debug, Clone, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_plain_text(&self, bytes: &[u8], mime_type: &str) -> Result<String, EngineError> {
        let (base, charset) = parse_mime(mime_type);

        if !SUPPORTED_MIME_TYPES.contains(&base.as_str()) {
            return Err(EngineError::UnsupportedSourceFormat(mime_type.to_string()));
        }

        let encoding = match charset {
            Some(label) => encoding_rs::Encoding::for_label(label.as_bytes())
                .ok_or_else(|| EngineError::InvalidEncoding(label.clone()))?,
            None => encoding_rs::UTF_8,
        };

        // decode 会识别 BOM，BOM 优先于声明的编码
        let (text, used, had_errors) = encoding.decode(bytes);
        if had_errors {
            log::warn!("按 {} 解码时遇到无效字节，已替换为 U+FFFD", used.name());
        }

        Ok(text.into_owned())
    }
}

/// 拆分 MIME 类型与 charset 参数
fn parse_mime(mime_type: &str) -> (String, Option<String>) {
    let mut parts = mime_type.split(';');
    let base = parts.next().unwrap_or("").trim().to_lowercase();

    let charset = parts
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
        .map(|(_, value)| value.trim().trim_matches('"').to_string());

    (base, charset)
}

/// 根据文件扩展名推断 MIME 类型
pub fn mime_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("txt") | Some("text") => "text/plain",
        Some("md") | Some("markdown") => "text/markdown",
        Some("html") | Some("htm") => "text/html",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_plain_text() {
        let extractor = PlainTextExtractor;
        let text = extractor
            .extract_plain_text("合同正文".as_bytes(), "text/plain")
            .unwrap();
        assert_eq!(text, "合同正文");
    }

    #[test]
    fn test_charset_parameter() {
        let extractor = PlainTextExtractor;
        let (bytes, _, _) = encoding_rs::GBK.encode("甲方");

        let text = extractor
            .extract_plain_text(&bytes, "text/plain; charset=\"GBK\"")
            .unwrap();
        assert_eq!(text, "甲方");
    }

    #[test]
    fn test_bom_is_stripped() {
        let extractor = PlainTextExtractor;
        let bytes = b"\xEF\xBB\xBFhello";
        assert_eq!(extractor.extract_plain_text(bytes, "text/markdown").unwrap(), "hello");
    }

    #[test]
    fn test_unsupported_format() {
        let extractor = PlainTextExtractor;
        let result = extractor.extract_plain_text(b"PK\x03\x04", "application/vnd.openxmlformats-officedocument.wordprocessingml.document");
        assert!(matches!(result, Err(EngineError::UnsupportedSourceFormat(_))));
    }

    #[test]
    fn test_unknown_charset() {
        let extractor = PlainTextExtractor;
        let result = extractor.extract_plain_text(b"abc", "text/plain; charset=klingon");
        assert!(matches!(result, Err(EngineError::InvalidEncoding(label)) if label == "klingon"));
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("a/report.TXT")), "text/plain");
        assert_eq!(mime_for_path(Path::new("notes.md")), "text/markdown");
        assert_eq!(mime_for_path(Path::new("page.htm")), "text/html");
        assert_eq!(mime_for_path(Path::new("contract.docx")), "application/octet-stream");
        assert_eq!(mime_for_path(Path::new("no_extension")), "application/octet-stream");
    }
}
