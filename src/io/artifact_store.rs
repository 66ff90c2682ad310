/// 产物存储实现
///
/// 提供内存与目录两种一次性下载存储：句柄只能成功取回一次，之后返回 `DownloadExpired`。
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::traits::{ArtifactStore, DownloadHandle, StoredArtifact};
use crate::utils::EngineError;

/// 生成新句柄：时间戳 + 进程内序号
fn next_handle(counter: &AtomicU64) -> DownloadHandle {
    let seq = counter.fetch_add(1, Ordering::Relaxed);
    DownloadHandle::new(format!("dl-{}-{}", chrono::Utc::now().timestamp_millis(), seq))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// 一次性槽位表
///
/// 取回时移出产物本身，只保留句柄用于区分“已取走”和“不存在”。
#[derive(Debug)]
struct OneShotSlots<T> {
    live: HashMap<DownloadHandle, T>,
    taken: HashSet<DownloadHandle>,
}

impl<T> Default for OneShotSlots<T> {
    fn default() -> Self {
        Self {
            live: HashMap::new(),
            taken: HashSet::new(),
        }
    }
}

impl<T> OneShotSlots<T> {
    fn insert(&mut self, handle: DownloadHandle, value: T) {
        self.live.insert(handle, value);
    }

    fn take(&mut self, handle: &DownloadHandle) -> Result<T, EngineError> {
        match self.live.remove(handle) {
            Some(value) => {
                self.taken.insert(handle.clone());
                Ok(value)
            }
            None if self.taken.contains(handle) => {
                Err(EngineError::DownloadExpired(handle.to_string()))
            }
            None => Err(EngineError::UnknownDownload(handle.to_string())),
        }
    }
}

/// 内存产物存储
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    slots: Mutex<OneShotSlots<StoredArtifact>>,
    counter: AtomicU64,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 尚未取回的产物数量
    pub fn pending_count(&self) -> usize {
        lock(&self.slots).live.len()
    }

    /// 尚未取回的产物占用的字节数
    pub fn retained_bytes(&self) -> usize {
        lock(&self.slots).live.values().map(|artifact| artifact.bytes.len()).sum()
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn store(&self, bytes: Vec<u8>, suggested_filename: &str) -> Result<DownloadHandle, EngineError> {
        let handle = next_handle(&self.counter);
        let artifact = StoredArtifact {
            bytes,
            filename: suggested_filename.to_string(),
        };
        lock(&self.slots).insert(handle.clone(), artifact);
        log::debug!("产物已保存: {} ({})", handle, suggested_filename);
        Ok(handle)
    }

    fn retrieve(&self, handle: &DownloadHandle) -> Result<StoredArtifact, EngineError> {
        lock(&self.slots).take(handle)
    }
}

/// 目录产物存储
///
/// 产物写入 `dir/<handle>`，取回时读取并删除文件。
/// 句柄在读取文件之前就被消耗，读取或删除失败后同样不能再次取回。
#[derive(Debug)]
pub struct DirArtifactStore {
    dir: PathBuf,
    /// 句柄 -> 建议文件名
    entries: Mutex<OneShotSlots<String>>,
    counter: AtomicU64,
}

impl DirArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            entries: Mutex::new(OneShotSlots::default()),
            counter: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, handle: &DownloadHandle) -> PathBuf {
        self.dir.join(handle.as_str())
    }
}

impl ArtifactStore for DirArtifactStore {
    fn store(&self, bytes: Vec<u8>, suggested_filename: &str) -> Result<DownloadHandle, EngineError> {
        // 确保目录存在
        std::fs::create_dir_all(&self.dir)?;

        let handle = next_handle(&self.counter);
        std::fs::write(self.path_for(&handle), &bytes)?;

        lock(&self.entries).insert(handle.clone(), suggested_filename.to_string());
        log::debug!("产物已写入 {:?} ({})", self.path_for(&handle), suggested_filename);
        Ok(handle)
    }

    fn retrieve(&self, handle: &DownloadHandle) -> Result<StoredArtifact, EngineError> {
        let filename = lock(&self.entries).take(handle)?;

        let path = self.path_for(handle);
        let bytes = std::fs::read(&path)?;
        if let Err(e) = std::fs::remove_file(&path) {
            log::warn!("删除已取回的产物失败 {:?}: {}", path, e);
        }

        Ok(StoredArtifact { bytes, filename })
    }
}
