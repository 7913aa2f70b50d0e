//! # 旋转搜索结果数据模型
//!
//! 定义 AMORE 旋转函数结果记录与搜索模式。
//!
//! ## 依赖关系
//! - 被 `parsers/rotation_log.rs`, `ranking/`, `amore/` 使用
//! - 无外部模块依赖

use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 旋转搜索模式
///
/// 模式同时决定短名截取长度与排名截断上限：
/// - `ContaminantRot`: 污染物数据库搜索，截取 6 字符，保留前 20 名
/// - `FullRot`: 全数据库搜索，截取 7 字符，保留前 200 名
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SearchMode {
    /// Contaminant database rotation search
    ContaminantRot,
    /// Full database rotation search
    FullRot,
}

impl SearchMode {
    /// 模型/日志短名截取长度
    pub fn name_len(&self) -> usize {
        match self {
            SearchMode::ContaminantRot => 6,
            SearchMode::FullRot => 7,
        }
    }

    /// 排名结果截断上限
    pub fn result_cap(&self) -> usize {
        match self {
            SearchMode::ContaminantRot => 20,
            SearchMode::FullRot => 200,
        }
    }

    /// 从文件名截取短名
    pub fn short_name(&self, file_name: &str) -> String {
        file_name.chars().take(self.name_len()).collect()
    }
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchMode::ContaminantRot => write!(f, "contaminant-rot"),
            SearchMode::FullRot => write!(f, "full-rot"),
        }
    }
}

/// 单个模型的 AMORE 旋转函数结果
///
/// 相关性字段 (CC_F/RF_F/CC_I/CC_P/Icp) 在日志中可能溢出为非数值，
/// 此时以 `None` 记录（输出为 N/A），而非静默置零。
/// 字段顺序即 CSV 列顺序，表头沿用原始结果表的列名。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationResult {
    /// 日志/模型短名
    pub log_name: String,

    /// 旋转欧拉角 alpha (度)
    #[serde(rename = "ALPHA")]
    pub alpha: f64,
    /// 旋转欧拉角 beta (度)
    #[serde(rename = "BETA")]
    pub beta: f64,
    /// 旋转欧拉角 gamma (度)
    #[serde(rename = "GAMMA")]
    pub gamma: f64,

    /// 振幅相关系数
    #[serde(rename = "CC_F", serialize_with = "na_if_none", deserialize_with = "none_if_na")]
    pub cc_f: Option<f64>,
    /// 振幅 R 因子
    #[serde(rename = "RF_F", serialize_with = "na_if_none", deserialize_with = "none_if_na")]
    pub rf_f: Option<f64>,
    /// 强度相关系数
    #[serde(rename = "CC_I", serialize_with = "na_if_none", deserialize_with = "none_if_na")]
    pub cc_i: Option<f64>,
    /// Patterson 相关系数
    #[serde(rename = "CC_P", serialize_with = "na_if_none", deserialize_with = "none_if_na")]
    pub cc_p: Option<f64>,
    /// Icp 指标
    #[serde(rename = "Icp", serialize_with = "na_if_none", deserialize_with = "none_if_na")]
    pub icp: Option<f64>,

    /// CC_F 的 Z 分数（排名依据）
    #[serde(rename = "CC_F_Z_score")]
    pub cc_f_z_score: f64,
    /// CC_P 的 Z 分数
    #[serde(rename = "CC_P_Z_score")]
    pub cc_p_z_score: f64,
    /// 产生峰的旋转搜索次数
    #[serde(rename = "Number_of_rotation_searches_producing_peak")]
    pub peak_count: f64,
}

/// 缺失数值序列化为 N/A 哨兵
fn na_if_none<S>(value: &Option<f64>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(v) => serializer.serialize_f64(*v),
        None => serializer.serialize_str("N/A"),
    }
}

/// N/A 哨兵（或空字段）还原为 None
fn none_if_na<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if raw == "N/A" || raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(serde::de::Error::custom)
}
