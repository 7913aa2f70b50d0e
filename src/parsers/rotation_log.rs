//! # AMORE 旋转函数日志解析器
//!
//! 从 AMORE 日志中提取 SOLUTIONRCD 结果行并转为结构化记录。
//!
//! ## 依赖关系
//! - 被 `ranking/` 使用
//! - 使用 `models/rotation.rs`

use crate::error::{Result, SimbadError};
use crate::models::{RotationResult, SearchMode};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// 结果行哨兵前缀
const SOLUTION_SENTINEL: &str = " SOLUTIONRCD ";

/// 扫描单个旋转函数日志
///
/// 取第一条 Z 分数超过 `min_z_score` 的 SOLUTIONRCD 行；
/// 整个文件无合格行时返回 `Ok(None)`（该日志被跳过，不是错误）。
/// `min_z_score` 即原有的全局阈值，由调用方显式传入。
pub fn scan_rotation_log(
    path: &Path,
    mode: SearchMode,
    min_z_score: f64,
) -> Result<Option<RotationResult>> {
    let file = File::open(path).map_err(|e| SimbadError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let log_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| mode.short_name(n))
        .unwrap_or_default();

    let reader = BufReader::new(file);
    for line in reader.lines() {
        let line = line.map_err(|e| SimbadError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        if !line.starts_with(SOLUTION_SENTINEL) {
            continue;
        }

        let parsed =
            parse_solution_line(&line, min_z_score).map_err(|reason| SimbadError::ParseError {
                format: "AMORE log".to_string(),
                path: path.display().to_string(),
                reason,
            })?;

        if let Some(mut result) = parsed {
            result.log_name = log_name;
            return Ok(Some(result));
        }
    }

    Ok(None)
}

/// 解析一条 SOLUTIONRCD 行
///
/// 字段按固定位置取值：角度在 2-4 位，相关性指标在 8-12 位，
/// Z 分数与峰计数为末尾三个字段。角度与末尾字段必须为数值；
/// 相关性指标解析失败时单独降级为 `None`，不中断整行。
/// Z 分数未超过阈值时返回 `Ok(None)`。
pub fn parse_solution_line(
    line: &str,
    min_z_score: f64,
) -> std::result::Result<Option<RotationResult>, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 13 {
        return Err(format!(
            "SOLUTIONRCD line has {} fields, expected at least 13",
            fields.len()
        ));
    }

    let n = fields.len();
    let cc_f_z_score = parse_required(fields[n - 3], "CC_F_Z_score")?;
    if cc_f_z_score <= min_z_score {
        return Ok(None);
    }

    let alpha = parse_required(fields[2], "ALPHA")?;
    let beta = parse_required(fields[3], "BETA")?;
    let gamma = parse_required(fields[4], "GAMMA")?;
    let cc_p_z_score = parse_required(fields[n - 2], "CC_P_Z_score")?;
    let peak_count = parse_required(fields[n - 1], "peak count")?;

    Ok(Some(RotationResult {
        log_name: String::new(),
        alpha,
        beta,
        gamma,
        cc_f: fields[8].parse().ok(),
        rf_f: fields[9].parse().ok(),
        cc_i: fields[10].parse().ok(),
        cc_p: fields[11].parse().ok(),
        icp: fields[12].parse().ok(),
        cc_f_z_score,
        cc_p_z_score,
        peak_count,
    }))
}

fn parse_required(field: &str, name: &str) -> std::result::Result<f64, String> {
    field
        .parse::<f64>()
        .map_err(|_| format!("non-numeric {} field: '{}'", name, field))
}
