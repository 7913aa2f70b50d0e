//! # 蛋白结构数据模型
//!
//! 定义积分盒计算所需的最小 PDB 结构表示。
//!
//! ## 依赖关系
//! - 被 `parsers/pdb.rs` 和 `amore/geometry.rs` 使用
//! - 无外部模块依赖

/// 单个原子，正交坐标 (Å)
#[derive(Debug, Clone)]
pub struct PdbAtom {
    /// 原子名 (如 "CA")
    pub name: String,
    /// 正交坐标 [x, y, z]
    pub position: [f64; 3],
}

impl PdbAtom {
    pub fn new(name: impl Into<String>, position: [f64; 3]) -> Self {
        PdbAtom {
            name: name.into(),
            position,
        }
    }
}

/// 单条链
#[derive(Debug, Clone)]
pub struct PdbChain {
    /// 链标识符 (PDB 第 22 列)
    pub id: char,
    /// 原子列表
    pub atoms: Vec<PdbAtom>,
}

impl PdbChain {
    pub fn new(id: char) -> Self {
        PdbChain {
            id,
            atoms: Vec::new(),
        }
    }
}

/// 一个 PDB 文件中的结构模型
///
/// 多模型文件 (NMR 系综) 中只关心第一个 MODEL；
/// 积分盒计算只使用第一条链。
#[derive(Debug, Clone)]
pub struct PdbModel {
    /// 结构名称（通常来自文件名）
    pub name: String,
    /// 链列表，按出现顺序
    pub chains: Vec<PdbChain>,
    /// REMARK 2 中的分辨率 (Å)，缺失时为 None
    pub resolution: Option<f64>,
}

impl PdbModel {
    pub fn new(name: impl Into<String>) -> Self {
        PdbModel {
            name: name.into(),
            chains: Vec::new(),
            resolution: None,
        }
    }

    /// 第一条链，结构为空时返回 None
    pub fn first_chain(&self) -> Option<&PdbChain> {
        self.chains.first()
    }

    /// 全结构原子总数
    pub fn atom_count(&self) -> usize {
        self.chains.iter().map(|c| c.atoms.len()).sum()
    }
}
