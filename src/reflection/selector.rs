//! # 反射阵列选择器
//!
//! 将输入反射文件中异质的阵列集合（振幅/强度/反常对/重建振幅/
//! 自由标志）归一化为规范的 {F, I, 自由标志} 三列。
//! 推导以守卫规则序列表达，自上而下首个命中者生效。
//!
//! ## 依赖关系
//! - 被 `commands/mtz.rs`, `commands/contaminant.rs` 使用
//! - 使用 `reflection/miller.rs`, `reflection/mtz.rs`

use crate::error::{Result, SimbadError};
use crate::reflection::miller::{ArrayKind, MillerArray, Reflection};
use crate::reflection::mtz::{MtzColumn, MtzFile};
use std::collections::BTreeMap;
use std::path::Path;

const NO_DATA_MSG: &str = "No amplitudes or intensities found";

/// 六类阵列槽位，分类时同类后见者胜
#[derive(Debug, Default)]
pub struct ReflectionArraySelector {
    pub amplitude: Option<MillerArray>,
    pub anomalous_amplitude: Option<MillerArray>,
    pub reconstructed_amplitude: Option<MillerArray>,
    pub intensity: Option<MillerArray>,
    pub anomalous_intensity: Option<MillerArray>,
    pub free: Option<MillerArray>,
}

/// 推导完成的规范阵列组
#[derive(Debug)]
pub struct ProcessedArrays {
    /// 规范振幅列，标签 F
    pub amplitude: MillerArray,
    /// 规范强度列，标签 I
    pub intensity: MillerArray,
    /// 自由标志列，原标签或合成的 FreeR_flag
    pub free: MillerArray,
}

/// 一条守卫推导规则：源槽位存在即应用变换
type DerivationRule<'a> = (&'a Option<MillerArray>, fn(&MillerArray) -> MillerArray);

impl ReflectionArraySelector {
    /// 从 MTZ 文件读入并分类所有阵列
    pub fn from_file(path: &Path) -> Result<Self> {
        let mtz = MtzFile::read(path)?;
        Ok(Self::classify(extract_arrays(&mtz)))
    }

    /// 按观测类型分类到六个槽位
    pub fn classify(arrays: Vec<MillerArray>) -> Self {
        let mut selector = ReflectionArraySelector::default();

        for array in arrays {
            let slot = match array.kind {
                ArrayKind::Amplitude => &mut selector.amplitude,
                ArrayKind::AnomalousAmplitude => &mut selector.anomalous_amplitude,
                ArrayKind::ReconstructedAmplitude => &mut selector.reconstructed_amplitude,
                ArrayKind::Intensity => &mut selector.intensity,
                ArrayKind::AnomalousIntensity => &mut selector.anomalous_intensity,
                ArrayKind::FreeFlag => &mut selector.free,
            };
            *slot = Some(array);
        }

        selector
    }

    /// 推导规范的 {F, I, 自由标志} 阵列组
    ///
    /// 振幅与强度各自独立地从原始来源推导，互不链式依赖。
    pub fn process(&self) -> Result<ProcessedArrays> {
        let amplitude = self.derive_amplitude()?.with_label("F");
        let intensity = self.derive_intensity()?.with_label("I");

        let free = match &self.free {
            // 已有自由标志：标签原样保留
            Some(free) => free.clone(),
            None => intensity.generate_r_free_flags(),
        };

        Ok(ProcessedArrays {
            amplitude,
            intensity,
            free,
        })
    }

    /// 规范振幅的优先级回退链
    fn derive_amplitude(&self) -> Result<MillerArray> {
        let rules: [DerivationRule; 5] = [
            (&self.reconstructed_amplitude, |a| a.clone()),
            (&self.anomalous_amplitude, |a| a.reconstructed_amplitude()),
            (&self.anomalous_intensity, |a| {
                a.set_observation_type(ArrayKind::AnomalousAmplitude)
                    .reconstructed_amplitude()
            }),
            (&self.amplitude, |a| a.clone()),
            (&self.intensity, |a| {
                a.set_observation_type(ArrayKind::Amplitude)
            }),
        ];

        apply_first_rule(&rules)
    }

    /// 规范强度的优先级回退链
    fn derive_intensity(&self) -> Result<MillerArray> {
        let rules: [DerivationRule; 5] = [
            (&self.intensity, |a| a.clone()),
            (&self.amplitude, |a| {
                a.set_observation_type(ArrayKind::Intensity)
            }),
            (&self.anomalous_intensity, |a| a.as_non_anomalous_merged()),
            (&self.anomalous_amplitude, |a| {
                a.set_observation_type(ArrayKind::AnomalousIntensity)
                    .as_non_anomalous_merged()
            }),
            (&self.reconstructed_amplitude, |a| {
                a.set_observation_type(ArrayKind::AnomalousIntensity)
                    .as_non_anomalous_merged()
            }),
        ];

        apply_first_rule(&rules)
    }
}

fn apply_first_rule(rules: &[DerivationRule]) -> Result<MillerArray> {
    for (source, derive) in rules {
        if let Some(array) = source {
            return Ok(derive(array));
        }
    }
    Err(SimbadError::MissingData(NO_DATA_MSG.to_string()))
}

impl ProcessedArrays {
    /// 写出规范化 MTZ：恰好三个逻辑列，一次完整写入
    pub fn output(&self, path: &Path) -> Result<()> {
        let mut mtz = MtzFile::new("SIMBAD input columns");
        mtz.columns = vec![
            MtzColumn::new("H", 'H'),
            MtzColumn::new("K", 'H'),
            MtzColumn::new("L", 'H'),
            MtzColumn::new(&self.amplitude.label, 'F'),
            MtzColumn::new(format!("SIG{}", self.amplitude.label), 'Q'),
            MtzColumn::new(&self.intensity.label, 'J'),
            MtzColumn::new(format!("SIG{}", self.intensity.label), 'Q'),
            MtzColumn::new(&self.free.label, 'I'),
        ];

        // 三个阵列按 hkl 并集对齐，缺测以 NaN 填充
        let mut merged: BTreeMap<[i32; 3], [f32; 5]> = BTreeMap::new();
        let arrays = [&self.amplitude, &self.intensity, &self.free];
        for (slot, array) in arrays.iter().enumerate() {
            for reflection in &array.data {
                let row = merged
                    .entry(reflection.hkl)
                    .or_insert([f32::NAN, f32::NAN, f32::NAN, f32::NAN, f32::NAN]);
                match slot {
                    0 => {
                        row[0] = reflection.value as f32;
                        row[1] = reflection.sigma as f32;
                    }
                    1 => {
                        row[2] = reflection.value as f32;
                        row[3] = reflection.sigma as f32;
                    }
                    _ => row[4] = reflection.value as f32,
                }
            }
        }

        mtz.rows = merged
            .into_iter()
            .map(|(hkl, values)| {
                let mut row = vec![hkl[0] as f32, hkl[1] as f32, hkl[2] as f32];
                row.extend_from_slice(&values);
                row
            })
            .collect();

        mtz.write(path)
    }
}

/// 从 MTZ 列提取 Miller 阵列
///
/// H/K/L 为指数列；F/G/J/K 类型的值列各成一个阵列，
/// "SIG"+标签 的列自动配对为 sigma；
/// 整数列且标签含 "free" 视为自由标志。
pub fn extract_arrays(mtz: &MtzFile) -> Vec<MillerArray> {
    let labels = mtz.column_labels();
    let hkl_indices: Vec<usize> = ["H", "K", "L"]
        .iter()
        .filter_map(|l| mtz.column_index(l))
        .collect();
    if hkl_indices.len() != 3 {
        return Vec::new();
    }

    let mut arrays = Vec::new();

    for (col_idx, column) in mtz.columns.iter().enumerate() {
        let kind = match ArrayKind::from_column_type(column.ctype) {
            Some(kind) => kind,
            None => {
                if column.ctype == 'I' && column.label.to_lowercase().contains("free") {
                    ArrayKind::FreeFlag
                } else {
                    continue;
                }
            }
        };

        // Sigma 列本身不是独立阵列
        if column.label.starts_with("SIG") && labels.contains(&&column.label[3..]) {
            continue;
        }

        let sigma_label = format!("SIG{}", column.label);
        let sigma_idx = mtz.column_index(&sigma_label);

        let data: Vec<Reflection> = mtz
            .rows
            .iter()
            .filter_map(|row| {
                let value = row[col_idx];
                if value.is_nan() {
                    return None;
                }
                let hkl = [
                    row[hkl_indices[0]] as i32,
                    row[hkl_indices[1]] as i32,
                    row[hkl_indices[2]] as i32,
                ];
                let sigma = sigma_idx.map(|i| row[i] as f64).unwrap_or(0.0);
                Some(Reflection::new(hkl, value as f64, sigma))
            })
            .collect();

        let mut array = MillerArray::new(&column.label, kind, data);
        if sigma_idx.is_some() {
            array = array.with_sigma_label(sigma_label);
        }
        arrays.push(array);
    }

    arrays
}
