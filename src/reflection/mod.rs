//! # 反射数据层
//!
//! MTZ 二进制读写、Miller 数组模型及变换、规范列选择、
//! 列标签发现。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `error.rs`, `utils/output.rs`

pub mod labels;
pub mod miller;
pub mod mtz;
pub mod selector;

pub use labels::{get_labels, MtzLabels};
pub use miller::{ArrayKind, MillerArray, Reflection};
pub use mtz::{crystal_data, MtzColumn, MtzFile};
pub use selector::{ProcessedArrays, ReflectionArraySelector};
