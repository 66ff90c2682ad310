/// IO 抽象层模块
///
/// 该模块定义引擎与外部协作方之间的窄接口，遵循依赖倒置原则。
/// 引擎本身只消费纯文本、只产出 `(bytes, filename)`，不管理存储生命周期。
///
/// # 架构设计
///
/// - **traits**: 定义 `TextExtractor` / `ArtifactStore` 接口
/// - **text_extract**: 纯文本类文档的默认提取实现
/// - **artifact_store**: 一次性下载句柄的内存 / 目录实现
///
/// # 使用示例
///
/// ```rust,ignore
/// use doc_issue_engine::io::{ArtifactStore, MemoryArtifactStore};
///
/// let store = MemoryArtifactStore::new();
/// let handle = store.store_artifact(&artifact)?;
/// let stored = store.retrieve(&handle)?;   // 第二次取回会返回 DownloadExpired
/// ```
pub mod artifact_store;
pub mod text_extract;
pub mod traits;

// === 导出 trait 定义 ===
pub use traits::{ArtifactStore, DownloadHandle, StoredArtifact, TextExtractor};

// === 导出默认实现 ===
pub use artifact_store::{DirArtifactStore, MemoryArtifactStore};
pub use text_extract::{mime_for_path, PlainTextExtractor};
