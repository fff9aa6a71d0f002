use std::error::Error;
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;

use anyhow::Result;

use crate::application::ExitReport;

/// 格式化持续时间
pub fn format_duration(duration: std::time::Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, mins, secs)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}.{:03}s", secs, duration.subsec_millis())
    }
}

/// 每行一个匹配路径，按原始字节输出，不做编码转换
pub fn write_matches<W: Write>(out: &mut W, matches: &[PathBuf]) -> io::Result<()> {
    for path in matches {
        out.write_all(path.as_os_str().as_bytes())?;
        out.write_all(b"\n")?;
    }
    out.flush()
}

pub fn print_matches(matches: &[PathBuf]) -> Result<()> {
    let mut stdout = io::stdout().lock();
    write_matches(&mut stdout, matches)?;
    Ok(())
}

pub fn format_exit_report(report: &ExitReport) -> String {
    match report {
        ExitReport::Exited(code) => format!("Process finished with exit code {}", code),
        ExitReport::Signaled(signal) => format!("Process terminated by signal {}", signal),
    }
}

pub fn print_exit_report(report: &ExitReport) -> Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", format_exit_report(report))?;
    Ok(())
}

/// `ERROR <消息>: <原因链>`，原因通常是操作系统给出的描述
pub fn format_error(error: &(dyn Error + 'static)) -> String {
    let mut message = format!("ERROR {}", error);
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

pub fn print_error(error: &(dyn Error + 'static)) {
    eprintln!("{}", format_error(error));
}

pub fn print_warning(message: &str) {
    eprintln!("WARNING {}", message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FindError;
    use std::time::Duration;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.500s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
    }

    #[test]
    fn test_write_matches_one_per_line() {
        let mut out = Vec::new();
        let matches = vec![PathBuf::from("/r/a.txt"), PathBuf::from("/r/d/b.txt")];

        write_matches(&mut out, &matches).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "/r/a.txt\n/r/d/b.txt\n");
    }

    #[test]
    fn test_write_matches_keeps_raw_bytes() {
        use std::ffi::OsStr;

        let mut out = Vec::new();
        let matches = vec![PathBuf::from(OsStr::from_bytes(b"/r/bad\xffname"))];

        write_matches(&mut out, &matches).unwrap();

        assert_eq!(out, b"/r/bad\xffname\n".to_vec());
    }

    #[test]
    fn test_format_exit_report() {
        assert_eq!(format_exit_report(&ExitReport::Exited(3)), "Process finished with exit code 3");
        assert_eq!(format_exit_report(&ExitReport::Signaled(9)), "Process terminated by signal 9");
    }

    #[test]
    fn test_format_error_appends_os_description() {
        let error = FindError::RootAccess {
            path: PathBuf::from("/missing"),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        };

        assert_eq!(
            format_error(&error),
            "ERROR Unable to access root directory /missing: No such file or directory"
        );
    }
}
