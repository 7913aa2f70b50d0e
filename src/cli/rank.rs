//! # rank 子命令 CLI 定义
//!
//! 对已有 AMoRe 旋转日志目录独立排序，便于重跑排序而
//! 不重复搜索。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/rank.rs`

use clap::Args;
use std::path::PathBuf;

use crate::models::rotation::SearchMode;

/// rank 子命令参数
#[derive(Args, Debug)]
pub struct RankArgs {
    /// Directory containing AMoRe rotation logs
    pub log_dir: PathBuf,

    /// Search mode the logs were produced by
    #[arg(long, value_enum, default_value = "contaminant-rot")]
    pub mode: SearchMode,

    /// Minimum CC_F Z-score for a solution to count
    #[arg(long, default_value_t = 0.0)]
    pub min_z_score: f64,

    /// Number of top results to print
    #[arg(long, default_value_t = 10)]
    pub top_n: usize,

    /// Filename for the ranked CSV output
    #[arg(long, default_value = "rotation_results.csv")]
    pub output_csv: PathBuf,
}
