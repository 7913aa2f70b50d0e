//! # 解析器模块
//!
//! 提供候选模型 PDB 文件与 AMORE 日志的解析器。
//!
//! ## 依赖关系
//! - 被 `amore/` 和 `ranking/` 使用
//! - 使用 `models/` 数据模型
//! - 子模块: pdb, rotation_log

pub mod pdb;
pub mod rotation_log;
