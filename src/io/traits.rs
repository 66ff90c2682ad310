/// IO 抽象层 - trait 定义
///
/// 该模块定义了外部协作方的抽象接口，支持依赖注入和测试 mock。

use crate::export::Artifact;
use crate::utils::EngineError;

/// 一次性下载句柄
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DownloadHandle(String);

impl DownloadHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DownloadHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 取回的产物
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    pub bytes: Vec<u8>,
    pub filename: String,
}

/// 文本提取 trait
///
/// # 职责
/// - 把文档原始字节转换为纯文本
/// - 不识别的类型返回 `UnsupportedSourceFormat`（对整个操作是致命错误）
///
/// # 实现示例
/// ```rust,ignore
/// pub struct Utf8Only;
/// impl TextExtractor for Utf8Only {
///     fn extract_plain_text(&self, bytes: &[u8], mime_type: &str) -> Result<String, EngineError> {
///         String::from_utf8(bytes.to_vec())
///             .map_err(|_| EngineError::UnsupportedSourceFormat(mime_type.to_string()))
///     }
/// }
/// ```
pub trait TextExtractor {
    /// 提取纯文本
    ///
    /// # 参数
    /// * `bytes` - 文档原始字节
    /// * `mime_type` - 文档 MIME 类型（可带 `charset` 参数）
    fn extract_plain_text(&self, bytes: &[u8], mime_type: &str) -> Result<String, EngineError>;
}

/// 产物存储 trait
///
/// # 职责
/// - 保存导出的字节流，返回一次性下载句柄
/// - 同一句柄第二次取回返回 `DownloadExpired`
pub trait ArtifactStore {
    /// 保存产物
    ///
    /// # 参数
    /// * `bytes` - 产物字节
    /// * `suggested_filename` - 建议文件名
    fn store(&self, bytes: Vec<u8>, suggested_filename: &str) -> Result<DownloadHandle, EngineError>;

    /// 取回产物（只能成功一次）
    fn retrieve(&self, handle: &DownloadHandle) -> Result<StoredArtifact, EngineError>;

    /// 保存导出结果
    fn store_artifact(&self, artifact: &Artifact) -> Result<DownloadHandle, EngineError> {
        self.store(artifact.bytes.clone(), &artifact.filename)
    }
}
