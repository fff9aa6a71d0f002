use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use serde::{Deserialize, Serialize};

use crate::error::FindError;

/// 子进程的环境变量策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvPolicy {
    /// 不传递任何环境变量
    #[default]
    Empty,
    /// 继承当前进程的环境变量
    Inherit,
}

/// 子进程的结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReport {
    Exited(i32),
    Signaled(i32),
}

impl From<ExitStatus> for ExitReport {
    fn from(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => ExitReport::Exited(code),
            None => ExitReport::Signaled(status.signal().unwrap_or_default()),
        }
    }
}

/// 参数向量 `[程序路径, 参数1, ..., 参数N]`
///
/// 持有每个字符串的副本，生命周期覆盖整个启动过程。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgvBuilder {
    program: OsString,
    args: Vec<OsString>,
}

impl ArgvBuilder {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// 包含程序路径在内的参数个数
    pub fn len(&self) -> usize {
        self.args.len() + 1
    }

    /// 按顺序返回完整参数向量，第一个元素为程序路径
    pub fn to_vec(&self) -> Vec<OsString> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }

    /// 构造命令
    ///
    /// 与 execve 一致：不含 `/` 的程序路径相对当前目录解析，不搜索 PATH。
    /// argv[0] 保持原样。
    pub fn command(&self, env: EnvPolicy) -> Command {
        let program = Path::new(&self.program);
        let image = if self.program.as_bytes().contains(&b'/') {
            program.to_path_buf()
        } else {
            Path::new(".").join(program)
        };

        let mut command = Command::new(image);
        command.arg0(&self.program).args(&self.args);
        if env == EnvPolicy::Empty {
            command.env_clear();
        }
        command
    }
}

/// 启动子进程并等待其结束的能力
pub trait ProcessLauncher {
    fn launch(&self, argv: &ArgvBuilder, env: EnvPolicy) -> Result<ExitReport, FindError>;
}

/// 基于操作系统进程创建的实现
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn launch(&self, argv: &ArgvBuilder, env: EnvPolicy) -> Result<ExitReport, FindError> {
        let program = PathBuf::from(argv.program());

        // 程序映像无法加载时 spawn 直接返回错误
        let mut child = argv
            .command(env)
            .spawn()
            .map_err(|source| FindError::ProcessSpawn {
                program: program.clone(),
                source,
            })?;

        child
            .wait()
            .map(ExitReport::from)
            .map_err(|source| FindError::ProcessWait { program, source })
    }
}

/// 把全部匹配结果作为参数交给一个子进程
pub struct Dispatcher<L: ProcessLauncher = SystemLauncher> {
    launcher: L,
    env: EnvPolicy,
}

impl Dispatcher<SystemLauncher> {
    pub fn new(env: EnvPolicy) -> Self {
        Self::with_launcher(SystemLauncher, env)
    }
}

impl<L: ProcessLauncher> Dispatcher<L> {
    pub fn with_launcher(launcher: L, env: EnvPolicy) -> Self {
        Self { launcher, env }
    }

    pub fn env(&self) -> EnvPolicy {
        self.env
    }

    /// 启动一次 `program`，参数为所有匹配路径；阻塞直到子进程结束
    pub fn dispatch(&self, program: &Path, matches: &[PathBuf]) -> Result<ExitReport, FindError> {
        let argv = ArgvBuilder::new(program).args(matches);
        self.launcher.launch(&argv, self.env)
    }
}
