//! # PDB 结构解析器
//!
//! 解析候选模型 PDB 文件中积分盒计算所需的信息：
//! 原子坐标、链划分、REMARK 2 分辨率。
//!
//! ## 依赖关系
//! - 被 `amore/geometry.rs` 使用
//! - 使用 `models/pdb.rs`

use crate::error::{Result, SimbadError};
use crate::models::{PdbAtom, PdbChain, PdbModel};
use std::fs;
use std::path::Path;

/// 解析 PDB 文件
pub fn parse_pdb_file(path: &Path) -> Result<PdbModel> {
    let content = fs::read_to_string(path).map_err(|e| SimbadError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model")
        .to_string();

    parse_pdb_content(&content, &name).map_err(|reason| SimbadError::ParseError {
        format: "PDB".to_string(),
        path: path.display().to_string(),
        reason,
    })
}

/// 解析 PDB 文本内容
///
/// 多模型文件只保留第一个 MODEL（ENDMDL 处截止）。
pub fn parse_pdb_content(content: &str, name: &str) -> std::result::Result<PdbModel, String> {
    let mut model = PdbModel::new(name);

    for line in content.lines() {
        let record = record_name(line);

        match record {
            "REMARK" => {
                if model.resolution.is_none() {
                    model.resolution = parse_remark2_resolution(line);
                }
            }
            "ATOM" | "HETATM" => {
                let (chain_id, atom) = parse_atom_record(line)?;
                match model.chains.last_mut() {
                    Some(chain) if chain.id == chain_id => chain.atoms.push(atom),
                    _ => {
                        let mut chain = PdbChain::new(chain_id);
                        chain.atoms.push(atom);
                        model.chains.push(chain);
                    }
                }
            }
            // 第一个模型结束即停止
            "ENDMDL" => break,
            _ => {}
        }
    }

    if model.chains.is_empty() {
        return Err("no ATOM records found".to_string());
    }

    Ok(model)
}

/// 记录名（第 1-6 列）
fn record_name(line: &str) -> &str {
    let end = line.len().min(6);
    line[..end].trim_end()
}

/// 解析 ATOM/HETATM 固定列记录
///
/// 链标识第 22 列；坐标第 31-54 列，各 8 字符。
fn parse_atom_record(line: &str) -> std::result::Result<(char, PdbAtom), String> {
    if line.len() < 54 {
        return Err(format!("ATOM record too short: '{}'", line));
    }

    let atom_name = line[12..16].trim().to_string();
    let chain_id = line.chars().nth(21).unwrap_or(' ');

    let x = parse_coord(&line[30..38])?;
    let y = parse_coord(&line[38..46])?;
    let z = parse_coord(&line[46..54])?;

    Ok((chain_id, PdbAtom::new(atom_name, [x, y, z])))
}

fn parse_coord(field: &str) -> std::result::Result<f64, String> {
    field
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid coordinate field: '{}'", field))
}

/// 提取 REMARK 2 分辨率
///
/// 格式: "REMARK   2 RESOLUTION.    1.74 ANGSTROMS."
/// "NOT APPLICABLE" 或无法解析时返回 None。
fn parse_remark2_resolution(line: &str) -> Option<f64> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 || fields[1] != "2" || !fields[2].starts_with("RESOLUTION") {
        return None;
    }
    fields[3].parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PDB: &str = "\
HEADER    HYDROLASE                               12-JAN-98   1ABC
REMARK   2
REMARK   2 RESOLUTION.    1.74 ANGSTROMS.
ATOM      1  N   ALA A   1      11.104   6.134  -6.504  1.00  0.00           N
ATOM      2  CA  ALA A   1      11.639   6.071  -5.147  1.00  0.00           C
ATOM      3  C   ALA A   1      12.800   5.085  -5.032  1.00  0.00           C
ATOM      4  N   GLY B   1       0.000   0.000   0.000  1.00  0.00           N
END
";

    #[test]
    fn test_parse_pdb_basic() {
        let model = parse_pdb_content(SAMPLE_PDB, "1abc").unwrap();

        assert_eq!(model.chains.len(), 2);
        assert_eq!(model.chains[0].id, 'A');
        assert_eq!(model.chains[0].atoms.len(), 3);
        assert_eq!(model.chains[1].id, 'B');
        assert_eq!(model.resolution, Some(1.74));

        let ca = &model.chains[0].atoms[1];
        assert_eq!(ca.name, "CA");
        assert!((ca.position[0] - 11.639).abs() < 1e-6);
    }

    #[test]
    fn test_parse_pdb_missing_resolution() {
        let content = "\
REMARK   2 RESOLUTION. NOT APPLICABLE.
ATOM      1  CA  ALA A   1       1.000   2.000   3.000  1.00  0.00           C
";
        let model = parse_pdb_content(content, "nmr").unwrap();
        assert_eq!(model.resolution, None);
    }

    #[test]
    fn test_parse_pdb_first_model_only() {
        let content = "\
MODEL        1
ATOM      1  CA  ALA A   1       1.000   2.000   3.000  1.00  0.00           C
ENDMDL
MODEL        2
ATOM      1  CA  ALA A   1       9.000   9.000   9.000  1.00  0.00           C
ENDMDL
";
        let model = parse_pdb_content(content, "ensemble").unwrap();
        assert_eq!(model.atom_count(), 1);
        assert!((model.chains[0].atoms[0].position[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_pdb_no_atoms() {
        let content = "HEADER    EMPTY\nEND\n";
        assert!(parse_pdb_content(content, "empty").is_err());
    }

    #[test]
    fn test_parse_pdb_hetatm_included() {
        let content = "\
ATOM      1  CA  ALA A   1       1.000   2.000   3.000  1.00  0.00           C
HETATM    2  ZN   ZN A 101       4.000   5.000   6.000  1.00  0.00          ZN
";
        let model = parse_pdb_content(content, "zn").unwrap();
        assert_eq!(model.chains[0].atoms.len(), 2);
    }
}
