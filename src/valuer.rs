//! SqlValuer：延迟求值的绑定值。
//!
//! 重建语句时，只有当对应占位符真正出现在语句中（且不在字符串/注释里）才会调用 `value()`，
//! 适合代价较高或带副作用的取值逻辑。

use crate::value::SqlValue;

/// Valuer 求值失败。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("rebuild sql valuer error: {0}")]
pub struct ValuerError(pub String);

/// 可在重建阶段动态计算实际值的 trait。
pub trait SqlValuer: dyn_clone::DynClone + std::fmt::Debug {
    fn value(&self) -> Result<SqlValue, ValuerError>;
}

dyn_clone::clone_trait_object!(SqlValuer);
