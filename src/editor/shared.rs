/// 共享文档模块
///
/// 同一文档的写操作必须串行：写操作在写锁内完成"读取最新快照 -> 计算 -> 提交"，
/// 读操作（高亮、快照）使用读锁，可与其他读操作并发。

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::applicator::ApplyOutcome;
use super::document_editor::DocumentEditor;
use crate::decoration::DecorationSet;
use crate::export::{Artifact, ExportFormat};
use crate::utils::EngineError;

/// 内容快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    pub revision: u64,
    pub content: String,
}

/// 可跨线程共享的文档编辑器
#[derive(Debug, Clone)]
pub struct SharedDocument {
    inner: Arc<RwLock<DocumentEditor>>,
}

impl SharedDocument {
    pub fn new(editor: DocumentEditor) -> Self {
        Self {
            inner: Arc::new(RwLock::new(editor)),
        }
    }

    // 锁中毒时继续使用内部数据：编辑器的每次提交都在最后一步完成
    fn read_guard(&self) -> RwLockReadGuard<'_, DocumentEditor> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, DocumentEditor> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 在读锁内执行
    pub fn read<R>(&self, f: impl FnOnce(&DocumentEditor) -> R) -> R {
        f(&self.read_guard())
    }

    /// 在写锁内执行
    pub fn write<R>(&self, f: impl FnOnce(&mut DocumentEditor) -> R) -> R {
        f(&mut self.write_guard())
    }

    pub fn apply_issue(&self, issue_id: &str) -> Result<ApplyOutcome, EngineError> {
        self.write(|editor| editor.apply_issue(issue_id))
    }

    pub fn apply_all(&self) -> Result<ApplyOutcome, EngineError> {
        self.write(|editor| editor.apply_all())
    }

    pub fn reject_issue(&self, issue_id: &str) -> Result<(), EngineError> {
        self.write(|editor| editor.reject_issue(issue_id))
    }

    pub fn retry_issue(&self, issue_id: &str) -> Result<(), EngineError> {
        self.write(|editor| editor.retry_issue(issue_id))
    }

    pub fn decorations(&self) -> DecorationSet {
        self.read(|editor| editor.decorations())
    }

    pub fn export(&self, format: ExportFormat, preview: bool) -> Result<Artifact, EngineError> {
        self.read(|editor| editor.export(format, preview))
    }

    /// 当前版本号与内容
    pub fn snapshot(&self) -> DocumentSnapshot {
        self.read(|editor| DocumentSnapshot {
            revision: editor.revision(),
            content: editor.content().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue_types::{Issue, IssueStatus, Position};
    use std::thread;

    #[test]
    fn test_concurrent_single_and_all() {
        let content = "one two three four five six";
        let issues: Vec<Issue> = ["one", "two", "three", "four", "five", "six"]
            .iter()
            .map(|word| {
                let start = content.find(word).unwrap();
                Issue::new(*word, "t", *word, word.to_uppercase(), "", Position::new(start, start + word.len()))
            })
            .collect();
        let shared = SharedDocument::new(DocumentEditor::new("doc", content, issues));

        let handles: Vec<_> = ["two", "five", "six"]
            .into_iter()
            .map(|id| {
                let doc = shared.clone();
                thread::spawn(move || doc.apply_issue(id).unwrap())
            })
            .chain(std::iter::once({
                let doc = shared.clone();
                thread::spawn(move || doc.apply_all().unwrap())
            }))
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = shared.snapshot();
        assert_eq!(snapshot.content, "ONE TWO THREE FOUR FIVE SIX");
        shared.read(|editor| {
            assert!(editor.issues().iter().all(|i| i.status == IssueStatus::Applied));
            assert_eq!(editor.change_log().len(), 6);
        });
    }

    #[test]
    fn test_snapshot_revision_advances() {
        let issues = vec![Issue::new("a", "t", "quick", "slow", "", Position::new(2, 7))];
        let shared = SharedDocument::new(DocumentEditor::new("doc", "A quick fox.", issues));

        assert_eq!(shared.snapshot().revision, 0);
        shared.apply_all().unwrap();
        assert_eq!(shared.snapshot(), DocumentSnapshot { revision: 1, content: "A slow fox.".to_string() });
        assert_eq!(shared.decorations().len(), 1);
    }
}
