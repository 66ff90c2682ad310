pub mod config;
pub mod decoration;
pub mod editor;
pub mod export;
pub mod io;
pub mod issue_types;
pub mod locator;
pub mod text_index;
pub mod utils;

// 重新导出主要结构
pub use config::EngineConfig;
pub use decoration::{
    build_decorations, build_decorations_with_spans, Decoration, DecorationSet, DecorationStyle,
};
pub use editor::{
    apply, ApplyOutcome, ChangeLog, DocumentEditor, DocumentSnapshot, EditorStats,
    IssueStatusTracker, SharedDocument, TrackedChange,
};
pub use export::{serialize, AppliedSpans, Artifact, ExportFormat, Segment};
pub use issue_types::{Issue, IssueStatus, Position};
pub use locator::{locate, LocateMethod, ResolvedSpan};
pub use utils::EngineError;

// 常量定义
pub const ISSUES_FILE_EXTENSION: &str = "json";
