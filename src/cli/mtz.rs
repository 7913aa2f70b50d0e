//! # mtz 子命令 CLI 定义
//!
//! 反射数据工具统一入口，包含多个子命令：
//! - `prepare`: 规范化反射列并写出标准 MTZ
//! - `labels`: 查询反射文件的列标签
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/mtz.rs`

use clap::{Args, Subcommand};
use std::path::PathBuf;

/// mtz 主命令参数
#[derive(Args, Debug)]
pub struct MtzArgs {
    #[command(subcommand)]
    pub command: MtzCommands,
}

/// mtz 子命令
#[derive(Subcommand, Debug)]
pub enum MtzCommands {
    /// Derive canonical F/SIGF, I/SIGI and free-flag columns and write a new MTZ
    Prepare(PrepareArgs),

    /// Print the column labels discovered in a reflection file
    Labels(LabelsArgs),
}

/// prepare 子命令参数
#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Input reflection file (CCP4 MTZ format)
    pub input: PathBuf,

    /// Output path for the normalized MTZ
    #[arg(short, long, default_value = "prepared.mtz")]
    pub output: PathBuf,
}

/// labels 子命令参数
#[derive(Args, Debug)]
pub struct LabelsArgs {
    /// Input reflection file (CCP4 MTZ format)
    pub input: PathBuf,
}
