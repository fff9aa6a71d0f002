use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;

use bfsfind::application::{Config, Dispatcher};
use bfsfind::domain::{BfsWalker, SearchQuery};
use bfsfind::infrastructure::{ErrorLogger, Logger, LoggerTrait, RunSummary};
use bfsfind::presentation::{self, display};

/// 广度优先查找文件，可把全部结果交给一个程序处理
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// 写调试日志和错误日志文件
    #[clap(long)]
    log: bool,

    /// 配置文件路径，不存在时在该位置创建默认配置
    #[clap(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// 搜索根目录
    #[clap(required = true)]
    root: PathBuf,

    /// 查找条件: -inum N | -nlinks N | -name S | -path S | -size [+|-|=]N | -exec PROG
    #[clap(value_name = "EXPRESSION", trailing_var_arg = true, allow_hyphen_values = true)]
    expression: Vec<OsString>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(err) => {
            let error: &(dyn std::error::Error + 'static) = err.as_ref();
            presentation::print_error(error);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    // 参数错误必须在任何文件系统访问之前终止
    let query = SearchQuery::from_args(&args.root, args.expression.as_slice())?;
    for flag in &query.ignored {
        presentation::print_warning(&format!("Ignoring unrecognized option {}", flag));
    }

    let config = match &args.config {
        Some(path) => Config::load_or_create(path)?,
        None => Config::default(),
    };

    let log_enabled = args.log || config.logging.enabled;
    let logger = Logger::new(log_enabled, &config.logging.directory)?;
    let errors = ErrorLogger::new(log_enabled, &config.logging.directory)?;

    if logger.is_enabled() {
        logger.log_message(&format!("搜索根目录: {}", query.root.display()))?;
        logger.log_message(&format!("筛选条件: {:?}", query.filter))?;
        logger.log_message(&format!("目录句柄上限: {}", config.traversal.max_open_dirs))?;
        if let Some(program) = &query.exec {
            logger.log_message(&format!("执行程序: {}", program.display()))?;
        }
    }

    let start_time = Instant::now();
    let outcome = BfsWalker::new(&query, config.walk_options(), &logger, &errors).walk();

    let mut exit_code = ExitCode::SUCCESS;
    match &query.exec {
        Some(program) => {
            let dispatcher = Dispatcher::new(config.exec.environment);
            if logger.is_enabled() {
                logger.log_message(&format!(
                    "启动 {}，参数 {} 个，环境变量策略 {:?}",
                    program.display(),
                    outcome.matches.len(),
                    dispatcher.env()
                ))?;
            }

            match dispatcher.dispatch(program, &outcome.matches) {
                Ok(report) => {
                    display::print_exit_report(&report)?;
                    if logger.is_enabled() {
                        logger.log_message(&display::format_exit_report(&report))?;
                    }
                }
                Err(err) => {
                    errors.report(&err);
                    if err.is_fatal() {
                        exit_code = ExitCode::FAILURE;
                    }
                }
            }
        }
        None => display::print_matches(&outcome.matches)?,
    }

    let duration = start_time.elapsed();
    if logger.is_enabled() {
        logger.log_message(&format!("完成，用时 {}", display::format_duration(duration)))?;
        let stats = &outcome.stats;
        logger.finalize(&RunSummary {
            dirs: stats.dirs,
            files: stats.files,
            deferred: stats.deferred,
            matches: outcome.matches.len() as u64,
            errors: stats.errors,
            walk_duration: stats.duration,
            duration,
            error_log: errors.error_path().map(PathBuf::from),
        })?;
    }
    errors.finalize()?;

    Ok(exit_code)
}
