/// 编辑器层模块
///
/// 该模块提供问题应用引擎的有状态编辑接口，支持批量应用、状态追踪和变更记录。
/// 所有修改操作仅在内存中进行，导出需要显式调用。
///
/// # 架构设计
///
/// - **applicator**: 批量解析 + 冲突检测 + 倒序应用
/// - **delta**: 变更记录与会话内变更日志
/// - **status**: 问题状态机，决定哪些问题可以进入下一批
/// - **document_editor**: 单文档编辑会话
/// - **shared**: 单写者并发包装
///
/// # 使用示例
///
/// ```rust,ignore
/// use doc_issue_engine::{DocumentEditor, ExportFormat};
///
/// let mut editor = DocumentEditor::new("contract", content, issues);
///
/// let outcome = editor.apply_all()?;
/// println!("{}", outcome.summary());
///
/// let artifact = editor.export(ExportFormat::Html, true)?;
/// ```
pub mod applicator;
pub mod delta;
pub mod document_editor;
pub mod shared;
pub mod stats;
pub mod status;

// === 导出公共接口 ===
pub use applicator::{apply, ApplyOutcome};
pub use delta::{ChangeLog, TrackedChange};
pub use document_editor::DocumentEditor;
pub use shared::{DocumentSnapshot, SharedDocument};
pub use stats::EditorStats;
pub use status::{IssueStatusTracker, StatusCounts};
