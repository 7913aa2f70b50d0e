//! # MTZ 列标签发现
//!
//! 只读查询：定位振幅/强度/反常差列及其配对 sigma 列，
//! 并按启发式定位自由标志列。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `reflection/mtz.rs`, `utils/output.rs`

use crate::error::{Result, SimbadError};
use crate::reflection::mtz::MtzFile;
use crate::utils::output;
use std::path::Path;

/// 标签发现结果
#[derive(Debug, Clone, PartialEq)]
pub struct MtzLabels {
    /// 振幅列 (类型 F)
    pub f: String,
    /// 振幅 sigma 列
    pub sigf: String,
    /// 强度列 (类型 J)
    pub i: String,
    /// 强度 sigma 列
    pub sigi: String,
    /// 反常差列 (类型 D)，可缺失
    pub dano: Option<String>,
    /// 反常差 sigma 列，与 dano 同生同灭
    pub sigdano: Option<String>,
    /// 自由标志列
    pub free: Option<String>,
}

/// 发现输入 MTZ 的列标签
///
/// 振幅与强度必须各有配对 sigma 列；反常差缺失时
/// 降级为 (None, None) 而非报错。
pub fn get_labels(mtz_file: &Path) -> Result<MtzLabels> {
    let mtz = MtzFile::read(mtz_file)?;

    let (f, sigf) = find_typed_pair(&mtz, 'F', "structure amplitudes", mtz_file)?;
    let (i, sigi) = find_typed_pair(&mtz, 'J', "intensities", mtz_file)?;

    let (dano, sigdano) = match find_typed_pair(&mtz, 'D', "anomalous differences", mtz_file) {
        Ok((dano, sigdano)) => (Some(dano), Some(sigdano)),
        Err(_) => (None, None),
    };

    let free = find_free_label(&mtz);

    Ok(MtzLabels {
        f,
        sigf,
        i,
        sigi,
        dano,
        sigdano,
        free,
    })
}

/// 定位某类型的首列并要求 SIG 配对列存在
fn find_typed_pair(
    mtz: &MtzFile,
    ctype: char,
    description: &str,
    path: &Path,
) -> Result<(String, String)> {
    let ctypes = mtz.column_types();
    let clabels = mtz.column_labels();

    let idx = ctypes.iter().position(|&t| t == ctype).ok_or_else(|| {
        SimbadError::MissingData(format!(
            "Cannot find any {} in: {}",
            description,
            path.display()
        ))
    })?;
    let label = clabels[idx].to_string();

    let sigma = format!("SIG{}", label);
    if !clabels.contains(&sigma.as_str()) {
        return Err(SimbadError::MissingData(format!(
            "Cannot find label {} in file: {}",
            sigma,
            path.display()
        )));
    }

    Ok((label, sigma))
}

/// 启发式定位自由标志列
///
/// 标签含 "free" (不区分大小写) 且两类标志值 (0 / 非 0)
/// 各至少有一个有效反射；多列满足时告警并取后见者。
fn find_free_label(mtz: &MtzFile) -> Option<String> {
    let mut free: Option<String> = None;

    for column in &mtz.columns {
        if !column.label.to_lowercase().contains("free") {
            continue;
        }

        let values = mtz.column_values(&column.label)?;
        let n0 = values.iter().filter(|v| !v.is_nan() && **v == 0.0).count();
        let n1 = values.iter().filter(|v| !v.is_nan() && **v != 0.0).count();

        if n0 > 0 && n1 > 0 {
            if free.is_some() {
                output::print_warning("FOUND >1 R FREE label in file!");
            }
            free = Some(column.label.clone());
        }
    }

    free
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::mtz::MtzColumn;

    fn base_mtz() -> MtzFile {
        let mut mtz = MtzFile::new("labels test");
        mtz.columns = vec![
            MtzColumn::new("H", 'H'),
            MtzColumn::new("K", 'H'),
            MtzColumn::new("L", 'H'),
            MtzColumn::new("FP", 'F'),
            MtzColumn::new("SIGFP", 'Q'),
            MtzColumn::new("IMEAN", 'J'),
            MtzColumn::new("SIGIMEAN", 'Q'),
            MtzColumn::new("FreeR_flag", 'I'),
        ];
        mtz.rows = vec![
            vec![1.0, 0.0, 0.0, 100.0, 2.0, 10000.0, 40.0, 0.0],
            vec![0.0, 1.0, 0.0, 90.0, 2.0, 8100.0, 36.0, 1.0],
        ];
        mtz
    }

    fn written(mtz: &MtzFile) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        mtz.write(&dir.path().join("t.mtz")).unwrap();
        dir
    }

    #[test]
    fn test_get_labels_complete() {
        let dir = written(&base_mtz());
        let labels = get_labels(&dir.path().join("t.mtz")).unwrap();

        assert_eq!(labels.f, "FP");
        assert_eq!(labels.sigf, "SIGFP");
        assert_eq!(labels.i, "IMEAN");
        assert_eq!(labels.sigi, "SIGIMEAN");
        assert_eq!(labels.dano, None);
        assert_eq!(labels.sigdano, None);
        assert_eq!(labels.free.as_deref(), Some("FreeR_flag"));
    }

    #[test]
    fn test_get_labels_with_anomalous_difference() {
        let mut mtz = base_mtz();
        mtz.columns.push(MtzColumn::new("DANO", 'D'));
        mtz.columns.push(MtzColumn::new("SIGDANO", 'Q'));
        for row in &mut mtz.rows {
            row.push(5.0);
            row.push(1.0);
        }

        let dir = written(&mtz);
        let labels = get_labels(&dir.path().join("t.mtz")).unwrap();
        assert_eq!(labels.dano.as_deref(), Some("DANO"));
        assert_eq!(labels.sigdano.as_deref(), Some("SIGDANO"));
    }

    #[test]
    fn test_get_labels_missing_sigma_fails() {
        let mut mtz = base_mtz();
        // 去掉 SIGFP，保持行宽一致
        mtz.columns.remove(4);
        for row in &mut mtz.rows {
            row.remove(4);
        }

        let dir = written(&mtz);
        let err = get_labels(&dir.path().join("t.mtz")).unwrap_err();
        assert!(matches!(err, SimbadError::MissingData(_)));
        assert!(err.to_string().contains("SIGFP"));
    }

    #[test]
    fn test_get_labels_no_amplitudes_fails() {
        let mut mtz = base_mtz();
        mtz.columns.retain(|c| c.ctype != 'F');
        for row in &mut mtz.rows {
            row.remove(3);
        }

        let dir = written(&mtz);
        let err = get_labels(&dir.path().join("t.mtz")).unwrap_err();
        assert!(err.to_string().contains("structure amplitudes"));
    }

    #[test]
    fn test_free_label_requires_both_classes() {
        let mut mtz = base_mtz();
        // 所有标志同为 0：无效自由列
        for row in &mut mtz.rows {
            row[7] = 0.0;
        }

        let dir = written(&mtz);
        let labels = get_labels(&dir.path().join("t.mtz")).unwrap();
        assert_eq!(labels.free, None);
    }
}
