//! # 数据模型模块
//!
//! 定义旋转搜索结果与蛋白结构的数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `amore/`, `ranking/` 使用
//! - 子模块: rotation, pdb

pub mod pdb;
pub mod rotation;

pub use pdb::{PdbAtom, PdbChain, PdbModel};
pub use rotation::{RotationResult, SearchMode};
