use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::Local;

use crate::error::FindError;
use crate::presentation::display;

/// 错误类型分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    Argument,
    Config,
    RootAccess,
    EntryAccess,
    ProcessSpawn,
    ProcessWait,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Argument => "参数错误",
            ErrorType::Config => "配置错误",
            ErrorType::RootAccess => "根目录访问",
            ErrorType::EntryAccess => "文件访问",
            ErrorType::ProcessSpawn => "子进程创建",
            ErrorType::ProcessWait => "子进程等待",
        }
    }
}

/// 错误报告器
///
/// 每个错误都立即写到标准错误；启用日志时另外追加到错误日志文件并分类计数。
pub struct ErrorLogger {
    error_file: Arc<Mutex<Option<File>>>,
    error_path: PathBuf,
    enabled: bool,
    error_counts: Arc<Mutex<HashMap<ErrorType, usize>>>,
}

impl ErrorLogger {
    /// 创建新的错误报告器
    pub fn new(enabled: bool, directory: &Path) -> Result<Self> {
        if !enabled {
            return Ok(Self::stderr_only());
        }

        let now = Local::now();
        let timestamp = now.format("%Y%m%d_%H%M%S");
        let error_path = directory.join(format!("error_{}.log", timestamp));

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&error_path)
            .with_context(|| format!("无法创建错误日志文件: {}", error_path.display()))?;

        writeln!(file, "# bfsfind 错误日志")?;
        writeln!(file, "# 开始时间: {}", now.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(file, "# ============================================")?;
        writeln!(file)?;

        Ok(Self {
            error_file: Arc::new(Mutex::new(Some(file))),
            error_path,
            enabled: true,
            error_counts: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// 只写标准错误、不落盘的报告器
    pub fn stderr_only() -> Self {
        Self {
            error_file: Arc::new(Mutex::new(None)),
            error_path: PathBuf::new(),
            enabled: false,
            error_counts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// 报告一个错误
    pub fn report(&self, error: &FindError) {
        display::print_error(error);

        let error_type = error.error_type();
        if let Ok(mut counts) = self.error_counts.lock() {
            *counts.entry(error_type).or_insert(0) += 1;
        }

        if self.enabled {
            // 错误日志写入失败不影响遍历
            let _ = self.append(error_type, error);
        }
    }

    fn append(&self, error_type: ErrorType, error: &FindError) -> Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");

        if let Ok(mut file_guard) = self.error_file.lock() {
            if let Some(ref mut file) = *file_guard {
                writeln!(file, "[{}] {} - {}", timestamp, error_type.as_str(), error)?;

                if let Some(path) = error.path() {
                    writeln!(file, "  文件路径: {}", path.display())?;
                }

                if let Some(source) = std::error::Error::source(error) {
                    writeln!(file, "  详细信息: {}", source)?;
                }

                writeln!(file)?;
                file.flush()?;
            }
        }

        Ok(())
    }

    /// 获取错误统计信息
    pub fn get_error_summary(&self) -> HashMap<ErrorType, usize> {
        if let Ok(counts) = self.error_counts.lock() {
            counts.clone()
        } else {
            HashMap::new()
        }
    }

    /// 获取总错误数
    pub fn get_total_errors(&self) -> usize {
        if let Ok(counts) = self.error_counts.lock() {
            counts.values().sum()
        } else {
            0
        }
    }

    pub fn has_errors(&self) -> bool {
        self.get_total_errors() > 0
    }

    pub fn error_path(&self) -> Option<&Path> {
        self.enabled.then_some(self.error_path.as_path())
    }

    /// 完成错误日志记录
    pub fn finalize(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        if let Ok(mut file_guard) = self.error_file.lock() {
            if let Some(ref mut file) = *file_guard {
                let now = Local::now();
                writeln!(file, "# ============================================")?;
                writeln!(file, "# 结束时间: {}", now.format("%Y-%m-%d %H:%M:%S"))?;

                let summary = self.get_error_summary();
                if !summary.is_empty() {
                    writeln!(file, "# 错误统计:")?;
                    for (error_type, count) in &summary {
                        writeln!(file, "#   {}: {} 次", error_type.as_str(), count)?;
                    }
                    writeln!(file, "#   总计: {} 个错误", summary.values().sum::<usize>())?;
                } else {
                    writeln!(file, "# 无错误记录")?;
                }

                file.flush()?;
            }
        }

        Ok(())
    }
}
