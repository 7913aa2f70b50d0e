//! # AMORE 单模型流水线
//!
//! 对一个候选模型依次执行：积分盒计算 -> 表函数 (TABFUN) ->
//! 旋转函数 (ROTFUN)，产出供排名使用的旋转日志。
//!
//! ## 依赖关系
//! - 被 `amore/runner.rs` 调用
//! - 使用 `amore/geometry.rs`, `amore/job.rs`
//! - 使用 `models/rotation.rs`

use crate::amore::geometry::calculate_intr_box;
use crate::amore::job::{run_job, ScopedLog};
use crate::amore::AmoreConfig;
use crate::error::{Result, SimbadError};
use crate::models::SearchMode;
use std::path::Path;

/// 执行单个模型的旋转搜索流水线
///
/// FullRot 模式使用预计算的球谐系数，无需逐模型建表。
pub fn run_model_pipeline(config: &AmoreConfig, mode: SearchMode, model: &Path) -> Result<()> {
    let file_name = model
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| SimbadError::InvalidArgument(format!("bad model path: {:?}", model)))?;
    let name = mode.short_name(file_name);

    if mode == SearchMode::ContaminantRot {
        let (x, y, z, intrad) = calculate_intr_box(model)?;
        amore_tabfun(config, &name, model, x, y, z)?;
        amore_rotfun(config, &name, intrad)?;
    }

    Ok(())
}

/// AMORE 表函数：为模型片段生成结构因子表
///
/// 表函数日志是瞬态的，成功后即删除。
fn amore_tabfun(
    config: &AmoreConfig,
    name: &str,
    model: &Path,
    x: f64,
    y: f64,
    z: f64,
) -> Result<()> {
    let output_dir = config.output_dir();
    let args = vec![
        "xyzin1".to_string(),
        model.display().to_string(),
        "xyzout1".to_string(),
        output_dir.join(format!("{}_rot.pdb", name)).display().to_string(),
        "table1".to_string(),
        output_dir.join(format!("{}_sfs.tab", name)).display().to_string(),
    ];

    let key = format!(
        "TITLE: Produce table for MODEL FRAGMENT\n\
         TABFUN\n\
         CRYSTAL {} {} {} 90 90 120 ORTH 1\n\
         MODEL 1 BTARGET 23.5\n\
         SAMPLE 1 RESO 2.5 SHANN 2.5 SCALE 4.0\n",
        x, y, z
    );

    let log = ScopedLog::new(config.work_dir.join(format!("{}_tabfun.log", name)));
    if let Err(e) = run_job(&config.amore_exe_string(), &args, &key, log.path()) {
        // 失败的作业日志留给排查，只清理成功的
        log.keep();
        return Err(e);
    }
    Ok(())
}

/// AMORE 旋转函数：交叉旋转搜索，产出排名所需的日志
fn amore_rotfun(config: &AmoreConfig, name: &str, intrad: f64) -> Result<()> {
    let output_dir = config.output_dir();
    let args = vec![
        "table1".to_string(),
        output_dir.join(format!("{}_sfs.tab", name)).display().to_string(),
        "HKLPCK1".to_string(),
        output_dir.join(format!("{}.hkl", name)).display().to_string(),
        "hklpck0".to_string(),
        config.hkl_pack_path().display().to_string(),
        "clmn1".to_string(),
        output_dir.join(format!("{}.clmn", name)).display().to_string(),
        "clmn0".to_string(),
        output_dir
            .join(format!("{}_spmipch.clmn", name))
            .display()
            .to_string(),
        "MAPOUT".to_string(),
        output_dir.join("amore_cross.map").display().to_string(),
    ];

    let key = format!(
        "ROTFUN\n\
         TITLE: Generate HKLPCK1 from MODEL FRAGMENT 1\n\
         GENE 1   RESO 100.0 {shres}  CELL_MODEL 80 75 65\n\
         CLMN CRYSTAL ORTH  1 RESO  20.0  {shres}  SPHERE   {intrad}\n\
         CLMN MODEL 1     RESO  20.0  {shres} SPHERE   {intrad}\n\
         ROTA  CROSS  MODEL 1  PKLIM {pklim}  NPIC {npic} STEP {step}\n",
        shres = config.params.shres,
        intrad = intrad,
        pklim = config.params.pklim,
        npic = config.params.npic,
        step = config.params.rotastep,
    );

    // 旋转日志是排名阶段的输入，必须保留
    let logfile = config.clogs_dir().join(format!("{}.log", name));
    run_job(&config.amore_exe_string(), &args, &key, &logfile)
}

/// SORTFUN 预处理：将输入 MTZ 打包为 spmipch.hkl
///
/// 在任何模型作业之前执行一次，F/SIGF 标签来自标签发现。
pub fn amore_sortfun(config: &AmoreConfig, mtz: &Path, f: &str, sigf: &str) -> Result<()> {
    let args = vec![
        "hklin".to_string(),
        mtz.display().to_string(),
        "hklpck0".to_string(),
        config.hkl_pack_path().display().to_string(),
    ];

    let key = format!(
        "TITLE   ** spmi  packing h k l F for crystal**\n\
         SORTFUN RESOL 100.  2.5\n\
         LABI FP={}  SIGFP={}\n",
        f, sigf
    );

    let logfile = config.work_dir.join("SORTFUN.log");
    run_job(&config.amore_exe_string(), &args, &key, &logfile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amore::AmoreParams;
    use std::path::PathBuf;

    fn config_with_exe(exe: &str, work_dir: &Path) -> AmoreConfig {
        let config = AmoreConfig::new(
            PathBuf::from(exe),
            work_dir.to_path_buf(),
            AmoreParams::default(),
        );
        config.ensure_dirs().unwrap();
        config
    }

    #[test]
    fn test_tabfun_log_removed_on_success() {
        let dir = tempfile::tempdir().unwrap();
        // true 忽略参数并成功退出，作为外部程序的替身
        let config = config_with_exe("true", dir.path());

        amore_tabfun(&config, "P0ABC8", Path::new("model.pdb"), 1.0, 2.0, 3.0).unwrap();
        assert!(!dir.path().join("P0ABC8_tabfun.log").exists());
    }

    #[test]
    fn test_tabfun_log_kept_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        // false 以非零退出，日志必须留下供排查
        let config = config_with_exe("false", dir.path());

        let err =
            amore_tabfun(&config, "P0ABC8", Path::new("model.pdb"), 1.0, 2.0, 3.0).unwrap_err();
        assert!(matches!(err, SimbadError::CommandFailed { .. }));
        assert!(dir.path().join("P0ABC8_tabfun.log").exists());
    }
}
