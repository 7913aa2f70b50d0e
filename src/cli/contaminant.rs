//! # contaminant 子命令 CLI 定义
//!
//! 污染物旋转搜索全流程：反射数据准备、AMoRe 批量旋转
//! 搜索、日志解析与排序。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/contaminant.rs`

use clap::Args;
use std::path::PathBuf;

/// contaminant 子命令参数
#[derive(Args, Debug)]
pub struct ContaminantArgs {
    /// Input reflection file (CCP4 MTZ format)
    pub mtz: PathBuf,

    /// Directory containing contaminant search models (PDB format)
    #[arg(long)]
    pub models_dir: PathBuf,

    /// Path to the AMoRe executable
    #[arg(long, default_value = "amore")]
    pub amore_exe: PathBuf,

    /// Working directory for intermediate and output files
    #[arg(long, default_value = "simbad_work")]
    pub work_dir: PathBuf,

    /// Number of worker threads (0 = auto-detect)
    #[arg(long, default_value_t = 0)]
    pub nproc: usize,

    // ─────────────────────────────────────────────────────────────
    // AMoRe rotation function options
    // ─────────────────────────────────────────────────────────────
    /// Spherical harmonic resolution limit (Å)
    #[arg(long, default_value_t = 3.0)]
    pub shres: f64,

    /// Peak list cutoff for the rotation function
    #[arg(long, default_value_t = 0.5)]
    pub pklim: f64,

    /// Number of rotation function peaks to keep
    #[arg(long, default_value_t = 50)]
    pub npic: u32,

    /// Rotation search angular step (degrees)
    #[arg(long, default_value_t = 1.0)]
    pub rotastep: f64,

    // ─────────────────────────────────────────────────────────────
    // Ranking options
    // ─────────────────────────────────────────────────────────────
    /// Minimum CC_F Z-score for a solution to count
    #[arg(long, default_value_t = 0.0)]
    pub min_z_score: f64,

    /// Number of top results to print
    #[arg(long, default_value_t = 10)]
    pub top_n: usize,

    /// Filename for the ranked CSV output
    #[arg(long, default_value = "contaminant_results.csv")]
    pub output_csv: PathBuf,
}
