//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `contaminant`: 污染物旋转搜索全流程
//! - `mtz`: 反射数据工具（嵌套子命令）
//!   - `prepare`: 规范化反射列并写出标准 MTZ
//!   - `labels`: 查询反射文件的列标签
//! - `rank`: 对已有旋转日志排序并导出
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: contaminant, mtz, rank

pub mod contaminant;
pub mod mtz;
pub mod rank;

use clap::{Parser, Subcommand};

/// Simbad - 分子置换污染物筛查工具箱
#[derive(Parser)]
#[command(name = "simbad")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "A molecular replacement contaminant screening toolkit", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Run the full contaminant rotation search against a reflection file
    Contaminant(contaminant::ContaminantArgs),

    /// Reflection data utilities (prepare / inspect MTZ files)
    Mtz(mtz::MtzArgs),

    /// Rank existing rotation search logs and export results
    Rank(rank::RankArgs),
}
