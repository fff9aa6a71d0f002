use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

use crate::infrastructure::ErrorType;

/// 查找过程中可能出现的所有错误
#[derive(Error, Debug)]
pub enum FindError {
    // 参数错误
    #[error("Invalid number of arguments")]
    ArgumentCount,

    #[error("Invalid value `{value}` for {flag} argument")]
    InvalidNumber {
        flag: String,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Invalid value `{0}` for -size argument")]
    InvalidSizeSign(String),

    // 配置文件
    #[error("Invalid configuration: {0}")]
    Config(String),

    // 文件系统
    #[error("Unable to access root directory {path}")]
    RootAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to access file {path}")]
    EntryAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // 子进程
    #[error("Unable to create child process {program}")]
    ProcessSpawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error while waiting for {program}")]
    ProcessWait {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FindError {
    /// 出错的路径（如果有）
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::RootAccess { path, .. }
            | Self::EntryAccess { path, .. }
            | Self::ProcessSpawn { program: path, .. }
            | Self::ProcessWait { program: path, .. } => Some(path),
            _ => None,
        }
    }

    /// 是否必须立即终止进程
    ///
    /// 参数错误、配置错误和子进程创建失败是致命的；
    /// 根目录/条目访问失败和等待失败只需报告，程序照常结束。
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ArgumentCount
                | Self::InvalidNumber { .. }
                | Self::InvalidSizeSign(_)
                | Self::Config(_)
                | Self::ProcessSpawn { .. }
        )
    }

    /// 错误分类，用于错误日志统计
    pub fn error_type(&self) -> ErrorType {
        match self {
            Self::ArgumentCount | Self::InvalidNumber { .. } | Self::InvalidSizeSign(_) => {
                ErrorType::Argument
            }
            Self::Config(_) => ErrorType::Config,
            Self::RootAccess { .. } => ErrorType::RootAccess,
            Self::EntryAccess { .. } => ErrorType::EntryAccess,
            Self::ProcessSpawn { .. } => ErrorType::ProcessSpawn,
            Self::ProcessWait { .. } => ErrorType::ProcessWait,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_fatal_classification() {
        assert!(FindError::ArgumentCount.is_fatal());
        assert!(FindError::InvalidSizeSign("50".into()).is_fatal());

        let spawn = FindError::ProcessSpawn {
            program: PathBuf::from("/nope"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(spawn.is_fatal());

        let root = FindError::RootAccess {
            path: PathBuf::from("/missing"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(!root.is_fatal());
        assert_eq!(root.error_type(), ErrorType::RootAccess);
        assert_eq!(root.path(), Some(&PathBuf::from("/missing")));

        let wait = FindError::ProcessWait {
            program: PathBuf::from("/bin/true"),
            source: io::Error::from(io::ErrorKind::Interrupted),
        };
        assert!(!wait.is_fatal());
    }

    #[test]
    fn test_invalid_number_keeps_source() {
        let source = "abc".parse::<u64>().unwrap_err();
        let err = FindError::InvalidNumber {
            flag: "-inum".into(),
            value: "abc".into(),
            source,
        };
        assert_eq!(err.to_string(), "Invalid value `abc` for -inum argument");
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.error_type(), ErrorType::Argument);
    }
}
