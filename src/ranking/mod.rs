//! # 结果排名模块
//!
//! 扫描旋转日志目录，按 CC_F Z 分数降序排名并截断输出。
//!
//! ## 依赖关系
//! - 被 `commands/contaminant.rs`, `commands/rank.rs` 使用
//! - 使用 `parsers/rotation_log.rs`, `models/rotation.rs`
//! - 使用 `rayon` 并行扫描日志

use crate::error::{Result, SimbadError};
use crate::models::{RotationResult, SearchMode};
use crate::parsers::rotation_log::scan_rotation_log;

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

/// 一次排名扫描的产出
#[derive(Debug, Default)]
pub struct RankedResults {
    /// 降序排名并截断后的结果
    pub results: Vec<RotationResult>,
    /// 无法解析的日志 (路径, 原因)
    pub parse_failures: Vec<(String, String)>,
    /// 扫描过的日志总数
    pub scanned: usize,
}

/// 终端表格行
#[derive(Tabled)]
struct RankRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "CC_F Z-score")]
    z_score: String,
    #[tabled(rename = "CC_P Z-score")]
    z_score_p: String,
    #[tabled(rename = "Peaks")]
    peaks: String,
}

/// 扫描日志目录并排名
///
/// 目录按任意深度展平；单个日志解析失败记为警告而非中止。
/// 结果按 CC_F_Z_score 稳定降序（同分保持发现顺序），
/// 截断到模式对应的上限 (ContaminantRot 20 / FullRot 200)。
pub fn rank_logs(log_dir: &Path, mode: SearchMode, min_z_score: f64) -> Result<RankedResults> {
    if !log_dir.is_dir() {
        return Err(SimbadError::DirectoryNotFound {
            path: log_dir.display().to_string(),
        });
    }

    // 文件名排序保证发现顺序确定，从而同分次序可复现
    let logs: Vec<PathBuf> = walkdir::WalkDir::new(log_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect();

    let scanned = logs.len();

    let outcomes: Vec<(PathBuf, Result<Option<RotationResult>>)> = logs
        .into_par_iter()
        .map(|log| {
            let outcome = scan_rotation_log(&log, mode, min_z_score);
            (log, outcome)
        })
        .collect();

    let mut ranked = RankedResults {
        scanned,
        ..Default::default()
    };

    for (log, outcome) in outcomes {
        match outcome {
            Ok(Some(result)) => ranked.results.push(result),
            Ok(None) => {}
            Err(e) => ranked
                .parse_failures
                .push((log.display().to_string(), e.to_string())),
        }
    }

    // 稳定排序：同分保持发现顺序
    ranked
        .results
        .sort_by(|a, b| b.cc_f_z_score.partial_cmp(&a.cc_f_z_score).unwrap_or(std::cmp::Ordering::Equal));
    ranked.results.truncate(mode.result_cap());

    Ok(ranked)
}

/// 保存排名结果为 CSV，表头与列顺序由记录结构给定
pub fn write_csv(results: &[RotationResult], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    for result in results {
        wtr.serialize(result)?;
    }

    wtr.flush().map_err(|e| SimbadError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// 渲染排名前 N 的终端表格
pub fn render_table(results: &[RotationResult], top_n: usize) -> String {
    let rows: Vec<RankRow> = results
        .iter()
        .take(top_n)
        .enumerate()
        .map(|(i, r)| RankRow {
            rank: i + 1,
            model: r.log_name.clone(),
            z_score: format!("{:.2}", r.cc_f_z_score),
            z_score_p: format!("{:.2}", r.cc_p_z_score),
            peaks: format!("{}", r.peak_count),
        })
        .collect();

    Table::new(&rows).to_string()
}
