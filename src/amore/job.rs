//! # 外部作业调用工具
//!
//! 运行 CCP4 系外部程序：参数走命令行，控制关键字走标准输入，
//! 标准输出落盘为日志文件。
//!
//! ## 依赖关系
//! - 被 `amore/pipeline.rs`, `amore/runner.rs` 使用
//! - 无外部模块依赖

use crate::error::{Result, SimbadError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// 运行一个外部作业
///
/// 程序不存在映射为 `CommandNotFound`，非零退出映射为 `CommandFailed`。
/// 无论成败，已产生的标准输出都先写入 `logfile` 供排查。
pub fn run_job(program: &str, args: &[String], keywords: &str, logfile: &Path) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|_| SimbadError::CommandNotFound {
            command: program.to_string(),
        })?;

    if let Some(ref mut stdin) = child.stdin {
        stdin.write_all(keywords.as_bytes()).ok();
    }

    let output = child
        .wait_with_output()
        .map_err(|e| SimbadError::CommandFailed {
            command: program.to_string(),
            stderr: e.to_string(),
        })?;

    fs::write(logfile, &output.stdout).map_err(|e| SimbadError::FileWriteError {
        path: logfile.display().to_string(),
        source: e,
    })?;

    if output.status.success() {
        Ok(())
    } else {
        Err(SimbadError::CommandFailed {
            command: program.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// 瞬态日志守卫
///
/// 作用域结束时删除日志文件（磁盘清理）；需要提取内容的调用方
/// 必须在守卫存活期间完成解析，或调用 `keep()` 取消删除。
pub struct ScopedLog {
    path: PathBuf,
    keep: bool,
}

impl ScopedLog {
    pub fn new(path: PathBuf) -> Self {
        ScopedLog { path, keep: false }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 取消删除，交出日志路径
    pub fn keep(mut self) -> PathBuf {
        self.keep = true;
        self.path.clone()
    }
}

impl Drop for ScopedLog {
    fn drop(&mut self) {
        if !self.keep {
            fs::remove_file(&self.path).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_log_removes_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transient.log");
        fs::write(&path, "scratch").unwrap();

        {
            let _guard = ScopedLog::new(path.clone());
            assert!(path.exists());
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_scoped_log_keep() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kept.log");
        fs::write(&path, "keep me").unwrap();

        let guard = ScopedLog::new(path.clone());
        let kept = guard.keep();
        assert!(kept.exists());
    }

    #[test]
    fn test_run_job_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("missing.log");

        let err = run_job("definitely-not-a-real-binary-xyz", &[], "", &log).unwrap_err();
        assert!(matches!(err, SimbadError::CommandNotFound { .. }));
    }

    #[test]
    fn test_run_job_captures_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("cat.log");

        // cat 回显标准输入，作为外部程序的替身
        run_job("cat", &[], "TITLE test keywords\n", &log).unwrap();
        let content = fs::read_to_string(&log).unwrap();
        assert!(content.contains("TITLE test keywords"));
    }
}
