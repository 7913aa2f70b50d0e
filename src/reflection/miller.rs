//! # Miller 阵列数据模型
//!
//! 反射数据阵列及选择器路由所需的变换：观测类型重标记、
//! Friedel 配对归并、重建振幅标记、自由标志生成。
//!
//! ## 依赖关系
//! - 被 `reflection/selector.rs` 使用
//! - 无外部模块依赖

/// 阵列观测类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayKind {
    /// 结构振幅 (列类型 F)
    Amplitude,
    /// 反常振幅对 (列类型 G)
    AnomalousAmplitude,
    /// 由反常对重建的振幅
    ReconstructedAmplitude,
    /// 强度 (列类型 J)
    Intensity,
    /// 反常强度对 (列类型 K)
    AnomalousIntensity,
    /// 交叉验证自由标志
    FreeFlag,
}

impl ArrayKind {
    /// 按 CCP4 列类型字符分类，无对应观测类型时返回 None
    pub fn from_column_type(ctype: char) -> Option<ArrayKind> {
        match ctype {
            'F' => Some(ArrayKind::Amplitude),
            'G' => Some(ArrayKind::AnomalousAmplitude),
            'J' => Some(ArrayKind::Intensity),
            'K' => Some(ArrayKind::AnomalousIntensity),
            _ => None,
        }
    }

    pub fn is_amplitude(&self) -> bool {
        matches!(
            self,
            ArrayKind::Amplitude | ArrayKind::AnomalousAmplitude | ArrayKind::ReconstructedAmplitude
        )
    }

    pub fn is_intensity(&self) -> bool {
        matches!(self, ArrayKind::Intensity | ArrayKind::AnomalousIntensity)
    }

    pub fn anomalous_flag(&self) -> bool {
        matches!(
            self,
            ArrayKind::AnomalousAmplitude | ArrayKind::AnomalousIntensity
        )
    }
}

/// 单个反射观测
#[derive(Debug, Clone, Copy)]
pub struct Reflection {
    /// Miller 指数 (h, k, l)
    pub hkl: [i32; 3],
    pub value: f64,
    pub sigma: f64,
}

impl Reflection {
    pub fn new(hkl: [i32; 3], value: f64, sigma: f64) -> Self {
        Reflection { hkl, value, sigma }
    }
}

/// 一个 Miller 阵列：标签 + 观测类型 + 反射数据
#[derive(Debug, Clone)]
pub struct MillerArray {
    /// 数据列标签
    pub label: String,
    /// 配对 sigma 列标签
    pub sigma_label: Option<String>,
    pub kind: ArrayKind,
    pub data: Vec<Reflection>,
}

impl MillerArray {
    pub fn new(label: impl Into<String>, kind: ArrayKind, data: Vec<Reflection>) -> Self {
        MillerArray {
            label: label.into(),
            sigma_label: None,
            kind,
            data,
        }
    }

    pub fn with_sigma_label(mut self, sigma_label: impl Into<String>) -> Self {
        self.sigma_label = Some(sigma_label.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// 重标记观测类型（数据不变，对应 set_observation_type）
    pub fn set_observation_type(&self, kind: ArrayKind) -> MillerArray {
        let mut array = self.clone();
        array.kind = kind;
        array
    }

    /// 将反常振幅标记为重建振幅
    pub fn reconstructed_amplitude(&self) -> MillerArray {
        self.set_observation_type(ArrayKind::ReconstructedAmplitude)
    }

    /// 去反常并归并等价反射
    ///
    /// Friedel 对 (h,k,l)/(-h,-k,-l) 以正规化指数归并，
    /// 值取平均，sigma 按平方和平均传播；结果为非反常强度。
    pub fn as_non_anomalous_merged(&self) -> MillerArray {
        use std::collections::BTreeMap;

        let mut groups: BTreeMap<[i32; 3], Vec<&Reflection>> = BTreeMap::new();
        for reflection in &self.data {
            groups
                .entry(canonical_hkl(reflection.hkl))
                .or_default()
                .push(reflection);
        }

        let data = groups
            .into_iter()
            .map(|(hkl, mates)| {
                let n = mates.len() as f64;
                let value = mates.iter().map(|r| r.value).sum::<f64>() / n;
                let sigma =
                    (mates.iter().map(|r| r.sigma * r.sigma).sum::<f64>()).sqrt() / n;
                Reflection::new(hkl, value, sigma)
            })
            .collect();

        let mut merged = MillerArray::new(self.label.clone(), ArrayKind::Intensity, data);
        merged.sigma_label = self.sigma_label.clone();
        merged
    }

    /// 按 ccp4 惯例生成自由标志
    ///
    /// 标志值循环 0..20，约 5% 反射落入自由集 (标志 0)。
    pub fn generate_r_free_flags(&self) -> MillerArray {
        let data = self
            .data
            .iter()
            .enumerate()
            .map(|(i, r)| Reflection::new(r.hkl, (i % 20) as f64, 0.0))
            .collect();

        MillerArray::new("FreeR_flag", ArrayKind::FreeFlag, data)
    }
}

/// Friedel 正规化：首个非零指数为负时整体取反
fn canonical_hkl(hkl: [i32; 3]) -> [i32; 3] {
    for index in hkl {
        if index > 0 {
            return hkl;
        }
        if index < 0 {
            return [-hkl[0], -hkl[1], -hkl[2]];
        }
    }
    hkl
}
