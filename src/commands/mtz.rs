//! # mtz 命令实现
//!
//! 反射数据工具：列规范化与标签查询。
//!
//! ## 依赖关系
//! - 使用 `cli/mtz.rs` 定义的参数
//! - 使用 `reflection/`, `utils/output.rs`

use crate::cli::mtz::{LabelsArgs, MtzArgs, MtzCommands, PrepareArgs};
use crate::error::{Result, SimbadError};
use crate::reflection::{self, ReflectionArraySelector};
use crate::utils::output;

/// 执行 mtz 命令
pub fn execute(args: MtzArgs) -> Result<()> {
    match args.command {
        MtzCommands::Prepare(args) => execute_prepare(args),
        MtzCommands::Labels(args) => execute_labels(args),
    }
}

/// 规范化反射列并写出标准 MTZ
fn execute_prepare(args: PrepareArgs) -> Result<()> {
    output::print_header("Reflection Data Preparation");

    if !args.input.exists() {
        return Err(SimbadError::FileNotFound {
            path: args.input.display().to_string(),
        });
    }

    let selector = ReflectionArraySelector::from_file(&args.input)?;
    let processed = selector.process()?;
    processed.output(&args.output)?;

    output::print_info(&format!("Free flag column: {}", processed.free.label));
    output::print_done(&format!("Normalized MTZ written to {}", args.output.display()));
    Ok(())
}

/// 查询反射文件的列标签
fn execute_labels(args: LabelsArgs) -> Result<()> {
    output::print_header("Reflection Column Labels");

    let labels = reflection::get_labels(&args.input)?;

    println!("F       : {}", labels.f);
    println!("SIGF    : {}", labels.sigf);
    println!("I       : {}", labels.i);
    println!("SIGI    : {}", labels.sigi);
    println!("DANO    : {}", labels.dano.as_deref().unwrap_or("-"));
    println!("SIGDANO : {}", labels.sigdano.as_deref().unwrap_or("-"));
    println!("FREE    : {}", labels.free.as_deref().unwrap_or("-"));

    Ok(())
}
