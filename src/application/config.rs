use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::application::dispatch::EnvPolicy;
use crate::domain::file_walker::{WalkOptions, DEFAULT_MAX_OPEN_DIRS};
use crate::error::FindError;

/// 目录句柄上限的允许范围
const MAX_OPEN_DIRS_LIMIT: usize = 65536;

/// 工具配置（与查找条件无关的运行参数）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 遍历相关配置
    pub traversal: TraversalConfig,
    /// 子进程相关配置
    pub exec: ExecConfig,
    /// 日志相关配置
    pub logging: LoggingConfig,
}

/// 遍历配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// 同时打开的目录句柄上限
    pub max_open_dirs: usize,
}

/// 子进程配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecConfig {
    /// 子进程环境变量策略，默认不传递任何环境变量
    pub environment: EnvPolicy,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 是否写调试日志和错误日志文件
    pub enabled: bool,
    /// 日志文件所在目录
    pub directory: PathBuf,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_open_dirs: DEFAULT_MAX_OPEN_DIRS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: PathBuf::from("."),
        }
    }
}

impl Config {
    /// 从配置文件加载配置，如果文件不存在则在该位置创建默认配置文件
    pub fn load_or_create(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            Self::load_from_file(config_path)
        } else {
            let config = Self::default();
            config.save_to_file(config_path)?;
            Ok(config)
        }
    }

    /// 从文件加载配置
    pub fn load_from_file(config_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("无法读取配置文件: {}", config_path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", config_path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("无法创建配置目录: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("无法序列化配置")?;

        fs::write(config_path, content)
            .with_context(|| format!("无法写入配置文件: {}", config_path.display()))?;

        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), FindError> {
        let max_open_dirs = self.traversal.max_open_dirs;
        if max_open_dirs == 0 || max_open_dirs > MAX_OPEN_DIRS_LIMIT {
            return Err(FindError::Config(format!(
                "traversal.max_open_dirs 必须在 1-{} 之间",
                MAX_OPEN_DIRS_LIMIT
            )));
        }

        Ok(())
    }

    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            max_open_dirs: self.traversal.max_open_dirs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.traversal.max_open_dirs, DEFAULT_MAX_OPEN_DIRS);
        assert_eq!(config.exec.environment, EnvPolicy::Empty);
        assert!(!config.logging.enabled);
        assert_eq!(config.logging.directory, PathBuf::from("."));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[exec]\nenvironment = \"inherit\"\n").unwrap();

        assert_eq!(config.exec.environment, EnvPolicy::Inherit);
        assert_eq!(config.traversal.max_open_dirs, DEFAULT_MAX_OPEN_DIRS);
    }

    #[test]
    fn test_load_or_create() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("bfsfind.toml");

        let created = Config::load_or_create(&config_path).unwrap();
        assert!(config_path.exists());
        assert_eq!(created, Config::default());

        fs::write(&config_path, "[traversal]\nmax_open_dirs = 8\n").unwrap();
        let loaded = Config::load_or_create(&config_path).unwrap();
        assert_eq!(loaded.walk_options().max_open_dirs, 8);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.traversal.max_open_dirs = 0;
        assert!(matches!(config.validate(), Err(FindError::Config(_))));

        config.traversal.max_open_dirs = MAX_OPEN_DIRS_LIMIT + 1;
        assert!(config.validate().is_err());

        config.traversal.max_open_dirs = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("bad.toml");

        fs::write(&config_path, "[traversal]\nmax_open_dirs = 0\n").unwrap();
        assert!(Config::load_from_file(&config_path).is_err());

        fs::write(&config_path, "[exec]\nenvironment = \"partial\"\n").unwrap();
        assert!(Config::load_from_file(&config_path).is_err());
    }
}
