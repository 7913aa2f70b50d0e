//! # rank 命令实现
//!
//! 对已有旋转日志目录独立排序并导出 CSV 和终端表格。
//!
//! ## 依赖关系
//! - 使用 `cli/rank.rs` 定义的参数
//! - 使用 `ranking/`, `utils/output.rs`

use crate::cli::rank::RankArgs;
use crate::error::Result;
use crate::ranking;
use crate::utils::output;

/// 执行 rank 命令
pub fn execute(args: RankArgs) -> Result<()> {
    output::print_header("Rotation Log Ranking");

    let ranked = ranking::rank_logs(&args.log_dir, args.mode, args.min_z_score)?;
    for (log, reason) in &ranked.parse_failures {
        output::print_warning(&format!("Unparsed log {}: {}", log, reason));
    }
    output::print_info(&format!(
        "Scanned {} logs ({} mode), {} solutions above Z-score {}",
        ranked.scanned,
        args.mode,
        ranked.results.len(),
        args.min_z_score
    ));

    if ranked.results.is_empty() {
        output::print_warning("No rotation search solutions found");
        return Ok(());
    }

    ranking::write_csv(&ranked.results, &args.output_csv)?;
    output::print_success(&format!("Ranked results written to {}", args.output_csv.display()));

    println!("{}", ranking::render_table(&ranked.results, args.top_n));
    output::print_done("Ranking finished");
    Ok(())
}
