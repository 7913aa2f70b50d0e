//! # AMORE 旋转搜索编排模块
//!
//! 驱动外部 AMORE 程序完成污染物旋转搜索：
//! 预处理 (SORTFUN)、逐模型流水线、并行作业池。
//!
//! ## 依赖关系
//! - 被 `commands/contaminant.rs` 使用
//! - 使用 `parsers/`, `models/`, `utils/`
//! - 子模块: geometry, job, pipeline, runner

pub mod geometry;
pub mod job;
pub mod pipeline;
pub mod runner;

pub use runner::{rotation_search, JobQueueRunner, SearchSummary};

use crate::error::{Result, SimbadError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// 旋转函数调谐参数
#[derive(Debug, Clone)]
pub struct AmoreParams {
    /// 球谐分辨率截止 (SHRES)
    pub shres: f64,
    /// 峰高下限 (PKLIM)
    pub pklim: f64,
    /// 保留峰数量 (NPIC)
    pub npic: u32,
    /// 旋转角步长 (ROTASTEP)
    pub rotastep: f64,
}

impl Default for AmoreParams {
    fn default() -> Self {
        AmoreParams {
            shres: 3.0,
            pklim: 0.5,
            npic: 50,
            rotastep: 1.0,
        }
    }
}

/// AMORE 运行配置
#[derive(Debug, Clone)]
pub struct AmoreConfig {
    /// AMORE 可执行文件路径
    pub amore_exe: PathBuf,
    /// 工作目录
    pub work_dir: PathBuf,
    /// 调谐参数
    pub params: AmoreParams,
}

impl AmoreConfig {
    pub fn new(amore_exe: PathBuf, work_dir: PathBuf, params: AmoreParams) -> Self {
        AmoreConfig {
            amore_exe,
            work_dir,
            params,
        }
    }

    /// 模型中间产物目录
    pub fn output_dir(&self) -> PathBuf {
        self.work_dir.join("output")
    }

    /// 旋转日志目录（排名阶段的输入）
    pub fn clogs_dir(&self) -> PathBuf {
        self.work_dir.join("clogs")
    }

    /// SORTFUN 打包输出
    pub fn hkl_pack_path(&self) -> PathBuf {
        self.work_dir.join("spmipch.hkl")
    }

    pub fn amore_exe_string(&self) -> String {
        self.amore_exe.display().to_string()
    }

    /// 预检：外部可执行文件必须存在，否则不得启动任何作业
    ///
    /// 裸命令名 (默认的 `amore`) 按 PATH 解析，带目录的路径直接检查。
    pub fn preflight(&self) -> Result<()> {
        if resolve_executable(&self.amore_exe).is_none() {
            return Err(SimbadError::CommandNotFound {
                command: self.amore_exe.display().to_string(),
            });
        }
        Ok(())
    }

    /// 建立工作目录结构
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.work_dir, &self.output_dir(), &self.clogs_dir()] {
            fs::create_dir_all(dir).map_err(|e| SimbadError::FileWriteError {
                path: dir.display().to_string(),
                source: e,
            })?;
        }
        Ok(())
    }
}

/// 解析可执行文件路径，与 `Command::new` 的查找规则一致
///
/// 单段名字逐个目录查 PATH，多段路径只做存在性检查。
fn resolve_executable(exe: &Path) -> Option<PathBuf> {
    if exe.components().count() > 1 {
        return exe.is_file().then(|| exe.to_path_buf());
    }

    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .map(|dir| dir.join(exe))
        .find(|candidate| candidate.is_file())
}

/// 展开模型目录为平面文件列表
///
/// 任意深度的常规文件合并到同一个队列，不保留目录层级。
pub fn enumerate_models(models_dir: &Path) -> Result<Vec<PathBuf>> {
    if !models_dir.is_dir() {
        return Err(SimbadError::DirectoryNotFound {
            path: models_dir.display().to_string(),
        });
    }

    let models: Vec<PathBuf> = walkdir::WalkDir::new(models_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect();

    Ok(models)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumerate_models_flattens_subdirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.pdb"), "x").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("b.pdb"), "x").unwrap();

        let models = enumerate_models(dir.path()).unwrap();
        assert_eq!(models.len(), 2);
    }

    #[test]
    fn test_enumerate_models_missing_dir() {
        let err = enumerate_models(Path::new("/no/such/dir")).unwrap_err();
        assert!(matches!(err, SimbadError::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_preflight_missing_exe() {
        let config = AmoreConfig::new(
            PathBuf::from("/no/such/amore"),
            PathBuf::from("/tmp"),
            AmoreParams::default(),
        );
        assert!(matches!(
            config.preflight().unwrap_err(),
            SimbadError::CommandNotFound { .. }
        ));
    }

    #[test]
    fn test_preflight_resolves_bare_name_via_path() {
        // sh 在任何 PATH 下都可由 Command::new 启动，预检必须同样通过
        let config = AmoreConfig::new(
            PathBuf::from("sh"),
            PathBuf::from("/tmp"),
            AmoreParams::default(),
        );
        assert!(config.preflight().is_ok());
    }

    #[test]
    fn test_preflight_bare_name_not_in_path() {
        let config = AmoreConfig::new(
            PathBuf::from("definitely-not-a-real-binary-xyz"),
            PathBuf::from("/tmp"),
            AmoreParams::default(),
        );
        assert!(matches!(
            config.preflight().unwrap_err(),
            SimbadError::CommandNotFound { .. }
        ));
    }
}
