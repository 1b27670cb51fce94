//! halo-sql-rebuilder：SQL 语句重建器。
//!
//! 扫描含 `:name` / `?` 占位符的原始语句，跳过字符串、标识符、注释、dollar-quote 等词法区域，
//! 把数组参数展开为多个占位符、为重复使用的名称分配唯一后缀，
//! 输出可直接交给驱动 prepare/bind 的语句与有序参数表。

pub mod bind;
pub mod dialect;
pub mod handlers;
pub mod macros;
pub mod rebuilder;
#[cfg(test)]
mod rebuilder_tests;
pub mod rules;
pub mod state;
mod string_builder;
pub mod value;
pub mod valuer;

pub use crate::bind::{BindError, BindKey, BindValues, FinalValues};
pub use crate::dialect::{
    DefaultDialectGuard, Dialect, DialectParseError, default_dialect, set_default_dialect,
    set_default_dialect_scoped,
};
pub use crate::rebuilder::{RebuildError, Rebuilder, Rebuilt, rebuild, rebuild_with_dialect, step};
pub use crate::rules::{DialectRules, Handler, LineComment, NumberedStyle};
pub use crate::state::{AnchoredPattern, Region, ScanState};
pub use crate::value::{BoundValue, SqlDateTime, SqlValue};
pub use crate::valuer::{SqlValuer, ValuerError};

/// 便捷命名空间：`use halo_space::prelude::*` 一次导入全部公开类型。
pub mod prelude {
    pub use crate::*;
}
