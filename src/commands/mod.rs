//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `amore/`, `ranking/`, `reflection/`, `utils/`
//! - 子模块: contaminant, mtz, rank

pub mod contaminant;
pub mod mtz;
pub mod rank;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Contaminant(args) => contaminant::execute(args),
        Commands::Mtz(args) => mtz::execute(args),
        Commands::Rank(args) => rank::execute(args),
    }
}
