use std::collections::VecDeque;
use std::fs::{self, ReadDir};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::domain::filter::FileStat;
use crate::domain::query::SearchQuery;
use crate::error::FindError;
use crate::infrastructure::{ErrorLogger, LoggerTrait};

/// 同时保持打开的目录句柄数默认上限
pub const DEFAULT_MAX_OPEN_DIRS: usize = 256;

/// 遍历参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOptions {
    /// 队列中（含正在枚举的目录）最多打开的目录句柄数，至少为 1
    pub max_open_dirs: usize,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_open_dirs: DEFAULT_MAX_OPEN_DIRS,
        }
    }
}

/// 遍历统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub dirs: u64,
    pub files: u64,
    pub errors: u64,
    /// 因句柄上限而延后打开的目录数
    pub deferred: u64,
    pub duration: Duration,
}

/// 遍历结果：按发现顺序排列的匹配路径
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub matches: Vec<PathBuf>,
    pub stats: WalkStats,
}

/// 待处理的目录。句柄在枚举完成、条目被丢弃时自动关闭。
struct FrontierEntry {
    path: PathBuf,
    handle: Option<ReadDir>,
}

impl FrontierEntry {
    fn open(self) -> io::Result<(PathBuf, ReadDir)> {
        match self.handle {
            Some(handle) => Ok((self.path, handle)),
            None => fs::read_dir(&self.path).map(|handle| (self.path, handle)),
        }
    }
}

/// 广度优先的工作队列
struct Frontier {
    queue: VecDeque<FrontierEntry>,
    open_handles: usize,
    max_open_dirs: usize,
}

impl Frontier {
    fn new(max_open_dirs: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            open_handles: 0,
            max_open_dirs: max_open_dirs.max(1),
        }
    }

    fn push_open(&mut self, path: PathBuf, handle: ReadDir) {
        self.open_handles += 1;
        self.queue.push_back(FrontierEntry {
            path,
            handle: Some(handle),
        });
    }

    /// 新发现的子目录：句柄未满时立即打开，否则只记录路径，出队时再打开
    ///
    /// 返回 `Ok(true)` 表示被延后。打开失败时不入队。
    fn discover(&mut self, path: PathBuf) -> io::Result<bool> {
        // 正在枚举的目录也占一个句柄
        if self.open_handles + 1 < self.max_open_dirs {
            let handle = fs::read_dir(&path)?;
            self.push_open(path, handle);
            Ok(false)
        } else {
            self.queue.push_back(FrontierEntry { path, handle: None });
            Ok(true)
        }
    }

    fn pop(&mut self) -> Option<FrontierEntry> {
        let entry = self.queue.pop_front()?;
        if entry.handle.is_some() {
            self.open_handles -= 1;
        }
        Some(entry)
    }
}

/// 广度优先遍历器
pub struct BfsWalker<'a> {
    query: &'a SearchQuery,
    options: WalkOptions,
    logger: &'a dyn LoggerTrait,
    errors: &'a ErrorLogger,
}

impl<'a> BfsWalker<'a> {
    pub fn new(
        query: &'a SearchQuery,
        options: WalkOptions,
        logger: &'a dyn LoggerTrait,
        errors: &'a ErrorLogger,
    ) -> Self {
        Self {
            query,
            options,
            logger,
            errors,
        }
    }

    /// 从根目录开始逐层遍历，收集满足条件的非目录条目
    ///
    /// 根目录无法打开时报告错误并返回空结果；单个条目的错误只报告并跳过。
    pub fn walk(&self) -> WalkOutcome {
        let start = Instant::now();
        let mut outcome = WalkOutcome::default();
        let root = &self.query.root;

        if self.logger.is_enabled() {
            let _ = self.logger.log_message(&format!("开始扫描目录: {}", root.display()));
        }

        let handle = match fs::read_dir(root) {
            Ok(handle) => handle,
            Err(source) => {
                self.report(
                    &mut outcome.stats,
                    FindError::RootAccess {
                        path: root.clone(),
                        source,
                    },
                );
                outcome.stats.duration = start.elapsed();
                return outcome;
            }
        };

        let mut frontier = Frontier::new(self.options.max_open_dirs);
        frontier.push_open(root.clone(), handle);

        while let Some(entry) = frontier.pop() {
            let deferred_path = entry.path.clone();
            let (dir, handle) = match entry.open() {
                Ok(opened) => opened,
                Err(source) => {
                    self.report(
                        &mut outcome.stats,
                        FindError::EntryAccess {
                            path: deferred_path,
                            source,
                        },
                    );
                    continue;
                }
            };

            outcome.stats.dirs += 1;
            if self.logger.is_enabled() {
                let _ = self.logger.log_message(&format!("进入目录: {}", dir.display()));
            }

            self.scan_dir(&dir, handle, &mut frontier, &mut outcome);
        }

        outcome.stats.duration = start.elapsed();
        outcome
    }

    /// 枚举一个目录的全部条目，句柄随后释放
    fn scan_dir(&self, dir: &Path, handle: ReadDir, frontier: &mut Frontier, outcome: &mut WalkOutcome) {
        // read_dir 不会产生 "." 和 ".."
        for item in handle {
            let dir_entry = match item {
                Ok(dir_entry) => dir_entry,
                Err(source) => {
                    self.report(
                        &mut outcome.stats,
                        FindError::EntryAccess {
                            path: dir.to_path_buf(),
                            source,
                        },
                    );
                    break;
                }
            };

            let name = dir_entry.file_name();
            let full_path = dir.join(&name);

            let metadata = match fs::symlink_metadata(&full_path) {
                Ok(metadata) => metadata,
                Err(source) => {
                    self.report(
                        &mut outcome.stats,
                        FindError::EntryAccess {
                            path: full_path,
                            source,
                        },
                    );
                    continue;
                }
            };

            if metadata.is_dir() {
                match frontier.discover(full_path.clone()) {
                    Ok(false) => {}
                    Ok(true) => {
                        outcome.stats.deferred += 1;
                        if self.logger.is_enabled() {
                            let _ = self.logger.log_message(&format!(
                                "句柄已达上限，延后打开: {}",
                                full_path.display()
                            ));
                        }
                    }
                    Err(source) => self.report(
                        &mut outcome.stats,
                        FindError::EntryAccess {
                            path: full_path,
                            source,
                        },
                    ),
                }
                continue;
            }

            outcome.stats.files += 1;
            let stat = FileStat::from(&metadata);
            let matched = self.query.filter.should_include(&stat, &name);

            if self.logger.is_enabled() {
                let status = if matched { "匹配" } else { "已跳过" };
                let _ = self.logger.log_entry(&full_path, stat.size, status);
            }

            if matched {
                outcome.matches.push(full_path);
            }
        }
    }

    fn report(&self, stats: &mut WalkStats, error: FindError) {
        stats.errors += 1;
        self.errors.report(&error);
    }
}
