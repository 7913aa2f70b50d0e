//! # Simbad - 分子置换污染物筛查工具箱
//!
//! 将晶体学污染物筛查流程用 Rust 重构，统一成单一可执行文件。
//!
//! ## 子命令
//! - `contaminant` - 污染物旋转搜索全流程 (AMoRe)
//! - `mtz` - 反射数据工具
//!   - `prepare` - 规范化反射列并写出标准 MTZ
//!   - `labels` - 查询反射文件的列标签
//! - `rank` - 对已有旋转日志排序并导出
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── amore/     (AMORE 作业编排)
//!   │     ├── ranking/   (结果排名)
//!   │     ├── reflection/(反射数据层)
//!   │     ├── parsers/   (格式解析器)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod amore;
mod cli;
mod commands;
mod error;
mod models;
mod parsers;
mod ranking;
mod reflection;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
