//! # 积分盒几何计算
//!
//! 根据模型原子坐标计算 AMORE 表函数所需的积分半径与包围盒尺寸。
//!
//! ## 依赖关系
//! - 被 `amore/pipeline.rs` 使用
//! - 使用 `parsers/pdb.rs`, `models/pdb.rs`

use crate::error::{Result, SimbadError};
use crate::models::PdbModel;
use crate::parsers::pdb::parse_pdb_file;
use std::path::Path;

/// 无 REMARK 2 分辨率时的默认值 (Å)
const DEFAULT_RESOLUTION: f64 = 2.0;

/// 计算模型的积分盒
///
/// 返回 (x, y, z, intrad)：三个方向的盒尺寸与积分半径。
/// 仅使用第一个模型第一条链的原子。
pub fn calculate_intr_box(model: &Path) -> Result<(f64, f64, f64, f64)> {
    let structure = parse_pdb_file(model)?;
    let resolution = structure.resolution.unwrap_or(DEFAULT_RESOLUTION);

    let positions = first_chain_positions(&structure).ok_or_else(|| SimbadError::ParseError {
        format: "PDB".to_string(),
        path: model.display().to_string(),
        reason: "no atoms in first chain".to_string(),
    })?;

    Ok(intr_box_from_coords(&positions, resolution))
}

/// 包围盒几何本体，便于用合成坐标单测
///
/// 积分半径取最小盒边的 0.75 倍（近似球形结构），
/// 每个方向的尺寸 = 盒边 + 积分半径 + 分辨率。
pub fn intr_box_from_coords(positions: &[[f64; 3]], resolution: f64) -> (f64, f64, f64, f64) {
    let mut min = [f64::INFINITY; 3];
    let mut max = [f64::NEG_INFINITY; 3];

    for pos in positions {
        for axis in 0..3 {
            min[axis] = min[axis].min(pos[axis]);
            max[axis] = max[axis].max(pos[axis]);
        }
    }

    let xdiff = max[0] - min[0];
    let ydiff = max[1] - min[1];
    let zdiff = max[2] - min[2];

    let intrad = xdiff.min(ydiff).min(zdiff) * 0.75;

    (
        xdiff + intrad + resolution,
        ydiff + intrad + resolution,
        zdiff + intrad + resolution,
        intrad,
    )
}

fn first_chain_positions(structure: &PdbModel) -> Option<Vec<[f64; 3]>> {
    let chain = structure.first_chain()?;
    if chain.atoms.is_empty() {
        return None;
    }
    Some(chain.atoms.iter().map(|a| a.position).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intr_box_synthetic() {
        // 盒边 (10, 5, 2)，最小边 2 -> intrad 1.5
        let coords = [
            [0.0, 0.0, 0.0],
            [10.0, 0.0, 0.0],
            [0.0, 5.0, 0.0],
            [0.0, 0.0, 2.0],
        ];
        let (x, y, z, intrad) = intr_box_from_coords(&coords, 2.0);

        assert!((intrad - 1.5).abs() < 1e-9);
        assert!((x - 13.5).abs() < 1e-9);
        assert!((y - 8.5).abs() < 1e-9);
        assert!((z - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_intr_box_single_atom() {
        // 零尺寸盒：所有输出退化为分辨率
        let coords = [[3.0, 3.0, 3.0]];
        let (x, y, z, intrad) = intr_box_from_coords(&coords, 2.0);

        assert!((intrad - 0.0).abs() < 1e-9);
        assert!((x - 2.0).abs() < 1e-9);
        assert!((y - 2.0).abs() < 1e-9);
        assert!((z - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_intr_box_negative_coords() {
        let coords = [[-5.0, -1.0, -1.0], [5.0, 1.0, 1.0]];
        let (x, _, _, intrad) = intr_box_from_coords(&coords, 1.0);

        // 盒边 (10, 2, 2)，intrad = 1.5
        assert!((intrad - 1.5).abs() < 1e-9);
        assert!((x - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_calculate_intr_box_from_file() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frag.pdb");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "REMARK   2 RESOLUTION.    2.00 ANGSTROMS.").unwrap();
        writeln!(
            f,
            "ATOM      1  CA  ALA A   1       0.000   0.000   0.000  1.00  0.00           C"
        )
        .unwrap();
        writeln!(
            f,
            "ATOM      2  CA  ALA A   2      10.000   0.000   0.000  1.00  0.00           C"
        )
        .unwrap();
        writeln!(
            f,
            "ATOM      3  CA  ALA A   3       0.000   5.000   0.000  1.00  0.00           C"
        )
        .unwrap();
        writeln!(
            f,
            "ATOM      4  CA  ALA A   4       0.000   0.000   2.000  1.00  0.00           C"
        )
        .unwrap();

        let (x, y, z, intrad) = calculate_intr_box(&path).unwrap();
        assert!((x - 13.5).abs() < 1e-9);
        assert!((y - 8.5).abs() < 1e-9);
        assert!((z - 5.0).abs() < 1e-9);
        assert!((intrad - 1.5).abs() < 1e-9);
    }
}
