use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;

use crate::domain::filter::{FileFilter, SizeFilter};
use crate::error::FindError;

/// 一次查找请求：根目录、筛选条件和可选的执行目标
///
/// 由命令行构建一次之后只读，以引用的形式传给遍历和判定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub root: PathBuf,
    pub filter: FileFilter,
    pub exec: Option<PathBuf>,
    /// 未识别的选项（已连同其取值一起跳过）
    pub ignored: Vec<String>,
}

impl SearchQuery {
    /// 只有根目录、没有任何条件的请求
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            filter: FileFilter::default(),
            exec: None,
            ignored: Vec::new(),
        }
    }

    /// 从根目录后面的“选项 值”对解析请求
    ///
    /// 选项必须成对出现；同一字段出现多次时以最后一次为准，
    /// `-name` 和 `-path` 写入同一个字段。取值按原始字节保存，不要求是 UTF-8。
    pub fn from_args<S: AsRef<OsStr>>(root: impl Into<PathBuf>, args: &[S]) -> Result<Self, FindError> {
        if args.len() % 2 != 0 {
            return Err(FindError::ArgumentCount);
        }

        let mut query = Self::new(root);

        for pair in args.chunks(2) {
            let flag = pair[0].as_ref();
            let value = pair[1].as_ref();

            match flag.to_str() {
                Some(flag @ "-inum") => query.filter.inode = Some(parse_number(flag, value)?),
                Some(flag @ "-nlinks") => query.filter.links = Some(parse_number(flag, value)?),
                Some("-name" | "-path") => query.filter.name = Some(value.to_os_string()),
                Some("-size") => query.filter.size = Some(parse_size(value)?),
                Some("-exec") => query.exec = Some(PathBuf::from(value)),
                _ => query.ignored.push(flag.to_string_lossy().into_owned()),
            }
        }

        Ok(query)
    }
}

/// 任何带符号的十进制整数都接受，负数只是匹配不到任何条目
fn parse_number(flag: &str, value: &OsStr) -> Result<i64, FindError> {
    let text = value.to_string_lossy();
    text.parse::<i64>().map_err(|source| FindError::InvalidNumber {
        flag: flag.to_string(),
        value: text.into_owned(),
        source,
    })
}

/// 解析 `-size` 的取值：`+N` 大于，`-N` 小于，`=N` 等于
fn parse_size(value: &OsStr) -> Result<SizeFilter, FindError> {
    let bytes = value.as_bytes();
    let build: fn(i64) -> SizeFilter = match bytes.first() {
        Some(b'+') => SizeFilter::Greater,
        Some(b'-') => SizeFilter::Less,
        Some(b'=') => SizeFilter::Equal,
        _ => return Err(FindError::InvalidSizeSign(value.to_string_lossy().into_owned())),
    };

    parse_number("-size", OsStr::from_bytes(&bytes[1..])).map(build)
}
