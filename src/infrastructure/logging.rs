use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use humansize::{format_size, BINARY};

/// 日志记录器trait
pub trait LoggerTrait: Send + Sync {
    fn is_enabled(&self) -> bool;
    fn log_message(&self, message: &str) -> Result<()>;
    fn log_entry(&self, path: &Path, size: u64, status: &str) -> Result<()>;
    fn finalize(&self, summary: &RunSummary) -> Result<()>;
}

/// 一次运行结束时写入日志尾部的统计
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub dirs: u64,
    pub files: u64,
    /// 因句柄上限而延后打开的目录数
    pub deferred: u64,
    pub matches: u64,
    /// 遍历期间报告并跳过的错误数
    pub errors: u64,
    pub walk_duration: Duration,
    pub duration: Duration,
    pub error_log: Option<PathBuf>,
}

/// 调试日志记录器，按时间戳命名的日志文件
pub struct Logger {
    log_file: Arc<Mutex<Option<File>>>,
    enabled: bool,
}

impl Logger {
    /// 创建新的日志记录器，`enabled` 为 false 时不创建任何文件
    pub fn new(enabled: bool, directory: &Path) -> Result<Self> {
        if !enabled {
            return Ok(Self::disabled());
        }

        let now = Local::now();
        let timestamp = now.format("%Y%m%d_%H%M%S");
        let log_path = directory.join(format!("debug_{}.log", timestamp));

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("无法创建日志文件: {}", log_path.display()))?;

        writeln!(file, "# bfsfind 调试日志")?;
        writeln!(file, "# 开始时间: {}", now.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(file, "# --------------------------------------------")?;

        Ok(Self {
            log_file: Arc::new(Mutex::new(Some(file))),
            enabled: true,
        })
    }

    pub fn disabled() -> Self {
        Self {
            log_file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    fn write_line(&self, line: std::fmt::Arguments<'_>) -> Result<()> {
        if let Ok(mut file_guard) = self.log_file.lock() {
            if let Some(ref mut file) = *file_guard {
                file.write_fmt(line)?;
                writeln!(file)?;
                file.flush()?;
            }
        }
        Ok(())
    }
}

impl LoggerTrait for Logger {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn log_message(&self, message: &str) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        self.write_line(format_args!("[{}] {}", timestamp, message))
    }

    fn log_entry(&self, path: &Path, size: u64, status: &str) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        self.write_line(format_args!(
            "[{}] 文件: {} | 大小: {} | 状态: {}",
            timestamp,
            path.display(),
            format_size(size, BINARY),
            status
        ))
    }

    fn finalize(&self, summary: &RunSummary) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let now = Local::now();
        self.write_line(format_args!("# --------------------------------------------"))?;
        self.write_line(format_args!("# 完成时间: {}", now.format("%Y-%m-%d %H:%M:%S")))?;
        self.write_line(format_args!("# 总用时: {:.3}秒", summary.duration.as_secs_f64()))?;
        self.write_line(format_args!("# 遍历用时: {:.3}秒", summary.walk_duration.as_secs_f64()))?;
        self.write_line(format_args!("# 扫描目录数: {}", summary.dirs))?;
        self.write_line(format_args!("# 延后打开目录数: {}", summary.deferred))?;
        self.write_line(format_args!("# 扫描文件数: {}", summary.files))?;
        self.write_line(format_args!("# 匹配文件数: {}", summary.matches))?;
        self.write_line(format_args!("# 遍历错误数: {}", summary.errors))?;
        if let Some(path) = &summary.error_log {
            self.write_line(format_args!("# 错误日志: {}", path.display()))?;
        }
        self.write_line(format_args!("# ============================================"))
    }
}
