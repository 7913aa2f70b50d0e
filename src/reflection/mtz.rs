//! # CCP4 MTZ 文件读写
//!
//! 实现列选择逻辑所需的最小 MTZ 二进制子集：魔数校验、
//! 头部记录 (NCOL/CELL/SYMINF/RESO/COLUMN/END)、f32 反射数据。
//! 数据假定小端字节序；RESO 记录在本子集中直接存 Å 值。
//!
//! ## 依赖关系
//! - 被 `reflection/selector.rs`, `reflection/labels.rs` 使用
//! - 无外部模块依赖

use crate::error::{Result, SimbadError};
use std::fs;
use std::path::Path;

/// MTZ 魔数
const MTZ_MAGIC: &[u8; 4] = b"MTZ ";
/// 数据区起始字 (1 起始编号)，即第 80 字节
const DATA_START_WORD: usize = 21;
/// 头部记录宽度
const RECORD_LEN: usize = 80;

/// 一列的元信息
#[derive(Debug, Clone)]
pub struct MtzColumn {
    /// 列标签 (如 "FP", "SIGFP")
    pub label: String,
    /// CCP4 列类型字符 (H/F/Q/J/G/K/D/I)
    pub ctype: char,
}

impl MtzColumn {
    pub fn new(label: impl Into<String>, ctype: char) -> Self {
        MtzColumn {
            label: label.into(),
            ctype,
        }
    }
}

/// 内存中的 MTZ 数据集
///
/// 每行一个反射，列序与 `columns` 一致，缺测以 NaN 表示。
#[derive(Debug, Clone)]
pub struct MtzFile {
    pub title: String,
    pub columns: Vec<MtzColumn>,
    /// 晶胞参数 (a, b, c, alpha, beta, gamma)
    pub cell: [f64; 6],
    /// 空间群名 (含空格, 如 "P 21 21 21")
    pub space_group: String,
    /// 分辨率范围 (低, 高) Å
    pub resolution: (f64, f64),
    pub rows: Vec<Vec<f32>>,
}

impl MtzFile {
    pub fn new(title: impl Into<String>) -> Self {
        MtzFile {
            title: title.into(),
            columns: Vec::new(),
            cell: [1.0, 1.0, 1.0, 90.0, 90.0, 90.0],
            space_group: "P 1".to_string(),
            resolution: (100.0, 2.0),
            rows: Vec::new(),
        }
    }

    pub fn column_labels(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.label.as_str()).collect()
    }

    pub fn column_types(&self) -> Vec<char> {
        self.columns.iter().map(|c| c.ctype).collect()
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.label == label)
    }

    /// 指定标签列的所有值
    pub fn column_values(&self, label: &str) -> Option<Vec<f32>> {
        let idx = self.column_index(label)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// 读取 MTZ 文件
    ///
    /// 魔数不符立即拒绝，任何处理开始之前。
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| SimbadError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        if bytes.len() < RECORD_LEN + 8 || &bytes[0..4] != MTZ_MAGIC {
            return Err(SimbadError::NotAnMtzFile {
                path: path.display().to_string(),
            });
        }

        // 头部指针先验证再参与偏移运算
        let header_word = i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if header_word < 1 {
            return Err(SimbadError::NotAnMtzFile {
                path: path.display().to_string(),
            });
        }
        let header_offset = (header_word as usize - 1) * 4;
        if header_offset > bytes.len() {
            return Err(SimbadError::NotAnMtzFile {
                path: path.display().to_string(),
            });
        }

        let mut mtz = MtzFile::new("");
        let mut ncol = 0usize;
        let mut nrefl = 0usize;

        for chunk in bytes[header_offset..].chunks(RECORD_LEN) {
            let record = String::from_utf8_lossy(chunk);
            let record = record.trim_end_matches(['\0', ' ']);
            let fields: Vec<&str> = record.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }

            match fields[0] {
                "TITLE" => mtz.title = record[5..].trim().to_string(),
                "NCOL" if fields.len() >= 3 => {
                    ncol = parse_header_num(fields[1], path)? as usize;
                    nrefl = parse_header_num(fields[2], path)? as usize;
                }
                "CELL" if fields.len() >= 7 => {
                    for (i, field) in fields[1..7].iter().enumerate() {
                        mtz.cell[i] = parse_header_num(field, path)?;
                    }
                }
                "SYMINF" => {
                    // 空间群名在单引号内
                    if let Some(sg) = extract_quoted(record) {
                        mtz.space_group = sg;
                    }
                }
                "RESO" if fields.len() >= 3 => {
                    mtz.resolution =
                        (parse_header_num(fields[1], path)?, parse_header_num(fields[2], path)?);
                }
                "COLUMN" if fields.len() >= 3 => {
                    let ctype = fields[2].chars().next().unwrap_or(' ');
                    mtz.columns.push(MtzColumn::new(fields[1], ctype));
                }
                "END" => break,
                _ => {}
            }
        }

        if mtz.columns.len() != ncol {
            return Err(SimbadError::ParseError {
                format: "MTZ".to_string(),
                path: path.display().to_string(),
                reason: format!(
                    "NCOL declares {} columns, header lists {}",
                    ncol,
                    mtz.columns.len()
                ),
            });
        }

        // 数据区: 第 80 字节起，每反射 ncol 个 f32；
        // 头部声明的数量不可信，尺寸运算必须防溢出
        let data_offset = (DATA_START_WORD - 1) * 4;
        let needed = nrefl
            .checked_mul(ncol)
            .and_then(|cells| cells.checked_mul(4))
            .and_then(|len| len.checked_add(data_offset));
        match needed {
            Some(needed) if bytes.len() >= needed => {}
            _ => {
                return Err(SimbadError::ParseError {
                    format: "MTZ".to_string(),
                    path: path.display().to_string(),
                    reason: "reflection data truncated".to_string(),
                });
            }
        }

        let mut cursor = data_offset;
        for _ in 0..nrefl {
            let mut row = Vec::with_capacity(ncol);
            for _ in 0..ncol {
                let word = [
                    bytes[cursor],
                    bytes[cursor + 1],
                    bytes[cursor + 2],
                    bytes[cursor + 3],
                ];
                row.push(f32::from_le_bytes(word));
                cursor += 4;
            }
            mtz.rows.push(row);
        }

        Ok(mtz)
    }

    /// 写出 MTZ 文件，单次完整写入
    pub fn write(&self, path: &Path) -> Result<()> {
        let ncol = self.columns.len();
        let nrefl = self.rows.len();

        let mut bytes = Vec::new();
        bytes.extend_from_slice(MTZ_MAGIC);

        let header_word = (DATA_START_WORD + nrefl * ncol) as i32;
        bytes.extend_from_slice(&header_word.to_le_bytes());
        // 机器戳: 小端 IEEE
        bytes.extend_from_slice(&[0x44, 0x41, 0x00, 0x00]);
        bytes.resize((DATA_START_WORD - 1) * 4, 0);

        for row in &self.rows {
            for value in row {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
        }

        push_record(&mut bytes, "VERS MTZ:V1.1");
        push_record(&mut bytes, &format!("TITLE {}", self.title));
        push_record(&mut bytes, &format!("NCOL {} {} 0", ncol, nrefl));
        push_record(
            &mut bytes,
            &format!(
                "CELL {:.4} {:.4} {:.4} {:.4} {:.4} {:.4}",
                self.cell[0], self.cell[1], self.cell[2], self.cell[3], self.cell[4], self.cell[5]
            ),
        );
        push_record(&mut bytes, &format!("SYMINF 1 1 P 1 '{}' PG1", self.space_group));
        push_record(
            &mut bytes,
            &format!("RESO {} {}", self.resolution.0, self.resolution.1),
        );
        for column in &self.columns {
            push_record(
                &mut bytes,
                &format!("COLUMN {} {} 0.0 0.0 1", column.label, column.ctype),
            );
        }
        push_record(&mut bytes, "END");

        fs::write(path, bytes).map_err(|e| SimbadError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })
    }
}

/// 从 MTZ 头部读取晶体学参数
///
/// 返回 (去空格空间群名, 高分辨率限, 晶胞参数)。
pub fn crystal_data(path: &Path) -> Result<(String, f64, [f64; 6])> {
    let mtz = MtzFile::read(path)?;
    let space_group = mtz.space_group.replace(' ', "");
    Ok((space_group, mtz.resolution.1, mtz.cell))
}

fn push_record(bytes: &mut Vec<u8>, record: &str) {
    let mut chunk = record.as_bytes().to_vec();
    chunk.truncate(RECORD_LEN);
    chunk.resize(RECORD_LEN, b' ');
    bytes.extend_from_slice(&chunk);
}

fn parse_header_num(field: &str, path: &Path) -> Result<f64> {
    field.parse::<f64>().map_err(|_| SimbadError::ParseError {
        format: "MTZ".to_string(),
        path: path.display().to_string(),
        reason: format!("bad numeric header field: '{}'", field),
    })
}

fn extract_quoted(record: &str) -> Option<String> {
    let start = record.find('\'')? + 1;
    let end = record[start..].find('\'')? + start;
    Some(record[start..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_mtz() -> MtzFile {
        let mut mtz = MtzFile::new("test dataset");
        mtz.cell = [78.1, 78.1, 37.0, 90.0, 90.0, 90.0];
        mtz.space_group = "P 43 21 2".to_string();
        mtz.resolution = (50.0, 1.8);
        mtz.columns = vec![
            MtzColumn::new("H", 'H'),
            MtzColumn::new("K", 'H'),
            MtzColumn::new("L", 'H'),
            MtzColumn::new("FP", 'F'),
            MtzColumn::new("SIGFP", 'Q'),
        ];
        mtz.rows = vec![
            vec![1.0, 0.0, 0.0, 120.5, 2.1],
            vec![0.0, 1.0, 0.0, 89.3, 1.7],
        ];
        mtz
    }

    #[test]
    fn test_mtz_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.mtz");

        sample_mtz().write(&path).unwrap();
        let read = MtzFile::read(&path).unwrap();

        assert_eq!(read.title, "test dataset");
        assert_eq!(read.column_labels(), vec!["H", "K", "L", "FP", "SIGFP"]);
        assert_eq!(read.column_types(), vec!['H', 'H', 'H', 'F', 'Q']);
        assert_eq!(read.space_group, "P 43 21 2");
        assert_eq!(read.rows.len(), 2);
        assert!((read.rows[0][3] - 120.5).abs() < 1e-4);
        assert!((read.cell[0] - 78.1).abs() < 1e-4);
    }

    #[test]
    fn test_mtz_rejects_non_mtz() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.mtz");
        fs::write(&path, "this is a text file, not binary mtz data at all").unwrap();

        let err = MtzFile::read(&path).unwrap_err();
        assert!(matches!(err, SimbadError::NotAnMtzFile { .. }));
    }

    #[test]
    fn test_mtz_rejects_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trunc.mtz");
        fs::write(&path, b"MTZ ").unwrap();

        assert!(MtzFile::read(&path).is_err());
    }

    #[test]
    fn test_mtz_rejects_zero_header_word() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zero.mtz");

        // 魔数合法但头部指针为 0
        let mut bytes = Vec::new();
        bytes.extend_from_slice(MTZ_MAGIC);
        bytes.extend_from_slice(&0i32.to_le_bytes());
        bytes.resize(96, 0);
        fs::write(&path, &bytes).unwrap();

        let err = MtzFile::read(&path).unwrap_err();
        assert!(matches!(err, SimbadError::NotAnMtzFile { .. }));
    }

    #[test]
    fn test_mtz_rejects_oversized_reflection_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.mtz");

        // NCOL 声明的反射数大到尺寸运算必然溢出
        let mut bytes = Vec::new();
        bytes.extend_from_slice(MTZ_MAGIC);
        bytes.extend_from_slice(&(DATA_START_WORD as i32).to_le_bytes());
        bytes.resize((DATA_START_WORD - 1) * 4, 0);
        push_record(&mut bytes, "NCOL 1 9000000000000000000 0");
        push_record(&mut bytes, "COLUMN H H 0.0 0.0 1");
        push_record(&mut bytes, "END");
        fs::write(&path, &bytes).unwrap();

        let err = MtzFile::read(&path).unwrap_err();
        assert!(matches!(err, SimbadError::ParseError { .. }));
    }

    #[test]
    fn test_crystal_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xtal.mtz");
        sample_mtz().write(&path).unwrap();

        let (space_group, resolution, cell) = crystal_data(&path).unwrap();
        assert_eq!(space_group, "P43212");
        assert!((resolution - 1.8).abs() < 1e-9);
        assert!((cell[2] - 37.0).abs() < 1e-4);
    }

    #[test]
    fn test_column_values() {
        let mtz = sample_mtz();
        let fp = mtz.column_values("FP").unwrap();
        assert_eq!(fp.len(), 2);
        assert!((fp[1] - 89.3).abs() < 1e-4);
        assert!(mtz.column_values("MISSING").is_none());
    }
}
