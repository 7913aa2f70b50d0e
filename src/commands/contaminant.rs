//! # contaminant 命令实现
//!
//! 污染物旋转搜索全流程编排。
//!
//! ## 功能
//! - 规范化反射数据并写出标准 MTZ
//! - SORTFUN 预处理生成 hkl 包
//! - 作业池并行执行逐模型 TABFUN/ROTFUN 流水线
//! - 解析旋转日志并输出排名
//!
//! ## 依赖关系
//! - 使用 `cli/contaminant.rs` 定义的参数
//! - 使用 `amore/`, `ranking/`, `reflection/`, `utils/output.rs`

use crate::amore::{self, pipeline, AmoreConfig, AmoreParams};
use crate::cli::contaminant::ContaminantArgs;
use crate::error::{Result, SimbadError};
use crate::models::SearchMode;
use crate::ranking;
use crate::reflection::{self, ReflectionArraySelector};
use crate::utils::output;

/// 执行 contaminant 命令
pub fn execute(args: ContaminantArgs) -> Result<()> {
    output::print_header("Contaminant Rotation Search");

    if !args.mtz.exists() {
        return Err(SimbadError::FileNotFound {
            path: args.mtz.display().to_string(),
        });
    }
    if !args.models_dir.exists() {
        return Err(SimbadError::DirectoryNotFound {
            path: args.models_dir.display().to_string(),
        });
    }

    let params = AmoreParams {
        shres: args.shres,
        pklim: args.pklim,
        npic: args.npic,
        rotastep: args.rotastep,
    };
    let config = AmoreConfig::new(args.amore_exe.clone(), args.work_dir.clone(), params);

    // 外部程序与目录就绪检查，先于任何数据处理
    config.preflight()?;
    config.ensure_dirs()?;

    // ── 反射数据准备 ──────────────────────────────────────────
    let (space_group, resolution, cell) = reflection::crystal_data(&args.mtz)?;
    output::print_info(&format!(
        "Crystal: {} | resolution {:.2} Å | cell {:.1} {:.1} {:.1}",
        space_group, resolution, cell[0], cell[1], cell[2]
    ));

    let prepared = config.work_dir.join("prepared.mtz");
    let selector = ReflectionArraySelector::from_file(&args.mtz)?;
    selector.process()?.output(&prepared)?;
    output::print_success(&format!("Normalized reflections: {}", prepared.display()));

    let labels = reflection::get_labels(&prepared)?;
    pipeline::amore_sortfun(&config, &prepared, &labels.f, &labels.sigf)?;
    output::print_success("Reflection pack ready (SORTFUN)");

    // ── 旋转搜索批次 ──────────────────────────────────────────
    let models = amore::enumerate_models(&args.models_dir)?;
    if models.is_empty() {
        return Err(SimbadError::MissingData(format!(
            "no search models found in: {}",
            args.models_dir.display()
        )));
    }
    output::print_info(&format!("Found {} search models", models.len()));

    let mode = SearchMode::ContaminantRot;
    let summary = amore::rotation_search(&config, mode, models, args.nproc);

    output::print_separator();
    output::print_info(&format!(
        "Rotation search: {} completed, {} failed, {} total",
        summary.completed,
        summary.failed,
        summary.total()
    ));
    for (model, reason) in &summary.failures {
        output::print_warning(&format!("{}: {}", model, reason));
    }

    // ── 排名与导出 ────────────────────────────────────────────
    let ranked = ranking::rank_logs(&config.clogs_dir(), mode, args.min_z_score)?;
    for (log, reason) in &ranked.parse_failures {
        output::print_warning(&format!("Unparsed log {}: {}", log, reason));
    }
    output::print_info(&format!(
        "Scanned {} logs, {} solutions above Z-score {}",
        ranked.scanned,
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
    output::print_done("Contaminant search finished");
    Ok(())
}
