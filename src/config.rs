/// 引擎配置
///
/// 所有字段都有默认值，配置文件（JSON）中可只写需要覆盖的部分。

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::export::ExportFormat;
use crate::utils::EngineError;

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// 待处理问题的高亮样式类
    pub pending_class: String,
    /// 应用中问题的高亮样式类
    pub applying_class: String,
    /// 已应用问题的高亮样式类
    pub applied_class: String,
    /// 应用失败问题的高亮样式类
    pub failed_class: String,
    /// 默认导出格式
    pub export_format: ExportFormat,
    /// 导出文件名后缀（如 `report_tracked.html`）
    pub filename_suffix: String,
    /// 导出时是否默认包含待处理问题（预览模式）
    pub include_pending_in_export: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pending_class: "issue-pending".to_string(),
            applying_class: "issue-applying".to_string(),
            applied_class: "issue-applied".to_string(),
            failed_class: "issue-failed".to_string(),
            export_format: ExportFormat::Html,
            filename_suffix: "_tracked".to_string(),
            include_pending_in_export: true,
        }
    }
}

impl EngineConfig {
    /// 从 JSON 文件加载配置
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&raw)?;
        log::debug!("已加载配置: {:?}", path);
        Ok(config)
    }

    /// 有路径时加载，否则使用默认配置
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, EngineError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "appliedClass": "ok", "exportFormat": "json" }"#).unwrap();

        assert_eq!(config.applied_class, "ok");
        assert_eq!(config.export_format, ExportFormat::Json);
        assert_eq!(config.pending_class, "issue-pending");
        assert_eq!(config.filename_suffix, "_tracked");
        assert!(config.include_pending_in_export);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("engine.json");
        std::fs::write(&path, r#"{ "filenameSuffix": "_review" }"#).unwrap();

        let config = EngineConfig::load_or_default(Some(&path)).unwrap();
        assert_eq!(config.filename_suffix, "_review");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = EngineConfig::load(Path::new("does-not-exist.json"));
        assert!(matches!(result, Err(EngineError::IoError(_))));
    }

    #[test]
    fn test_load_invalid_json_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(EngineConfig::load(&path), Err(EngineError::JsonError(_))));
        assert_eq!(EngineConfig::load_or_default(None).unwrap(), EngineConfig::default());
    }
}
