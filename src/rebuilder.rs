//! Rebuilder：驱动扫描主循环，把原始语句与参数重建为可直接 prepare/bind 的形式。
//!
//! ```
//! use halo_space::{bind_values, rebuild_with_dialect, Dialect};
//!
//! let values = bind_values! { "ids" => [1_i64, 2, 3], "name" => "foo" };
//! let out = rebuild_with_dialect(
//!     Dialect::PostgreSQL,
//!     "SELECT * FROM t WHERE id IN (:ids) AND name = :name AND note <> ':ids'",
//!     &values,
//! )
//! .unwrap();
//! assert_eq!(
//!     out.statement,
//!     "SELECT * FROM t WHERE id IN (:ids, :ids_0, :ids_1) AND name = :name AND note <> ':ids'"
//! );
//! assert_eq!(out.values.len(), 4);
//! ```

use crate::bind::{BindKey, BindValues, FinalValues};
use crate::dialect::{Dialect, default_dialect};
use crate::rules::DialectRules;
use crate::state::{Region, ScanState};
use crate::valuer::ValuerError;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RebuildError {
    #[error("rebuild missing parameter {0}")]
    MissingParameter(BindKey),
    #[error("rebuild unterminated {region} starting at offset {offset}")]
    Unterminated { region: Region, offset: usize },
    #[error("rebuild parser stuck at offset {offset}")]
    ParserStuck { offset: usize },
    #[error("rebuild read past the end of statement at offset {offset}")]
    OutOfBounds { offset: usize },
    #[error("rebuild duplicate final binding {0}")]
    DuplicateBinding(BindKey),
    #[error("{0}")]
    Valuer(#[from] ValuerError),
}

/// 重建结果：改写后的语句与按出现顺序排列的最终参数。
#[derive(Debug, Clone, PartialEq)]
pub struct Rebuilt {
    pub statement: String,
    pub values: FinalValues,
}

impl Rebuilt {
    pub fn into_parts(self) -> (String, FinalValues) {
        (self.statement, self.values)
    }
}

/// 语句重建器。本身无状态，可在线程间随意复制共享。
#[derive(Debug, Clone, Copy)]
pub struct Rebuilder {
    rules: &'static DialectRules,
    strict: bool,
}

impl Default for Rebuilder {
    fn default() -> Self {
        Self::new(default_dialect())
    }
}

impl Rebuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self::with_rules(dialect.rules())
    }

    /// 使用自定义方言规则表。
    pub fn with_rules(rules: &'static DialectRules) -> Self {
        Self {
            rules,
            strict: false,
        }
    }

    /// 严格模式：未闭合的字符串/注释返回 `RebuildError::Unterminated`。
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn rules(&self) -> &'static DialectRules {
        self.rules
    }

    pub fn rebuild(&self, statement: &str, values: &BindValues) -> Result<Rebuilt, RebuildError> {
        let mut state = ScanState::new(statement, values).strict(self.strict);
        drive(&mut state, self.rules)?;
        let (statement, values) = state.finish();
        debug!(
            dialect = self.rules.name,
            bindings = values.len(),
            "rebuilt statement"
        );
        Ok(Rebuilt { statement, values })
    }
}

/// 处理游标处的一个字符（或由它开启的整个区域），并校验游标确实前进了。
pub fn step(state: &mut ScanState<'_>, rules: &DialectRules) -> Result<(), RebuildError> {
    let before = state.offset();
    let c = state.current_char()?;
    match rules.handler_for(c) {
        Some(handler) => handler(state, rules)?,
        None => state.copy_current_char(),
    }
    if state.offset() <= before {
        return Err(RebuildError::ParserStuck { offset: before });
    }
    Ok(())
}

fn drive(state: &mut ScanState<'_>, rules: &DialectRules) -> Result<(), RebuildError> {
    // 每步至少前进一个字符
    let max_steps = state.source().chars().count() + 1;
    let mut steps = 0usize;
    while !state.done() {
        steps += 1;
        if steps > max_steps {
            return Err(RebuildError::ParserStuck {
                offset: state.offset(),
            });
        }
        step(state, rules)?;
    }
    Ok(())
}

/// 使用全局默认方言重建语句。
pub fn rebuild(statement: &str, values: &BindValues) -> Result<Rebuilt, RebuildError> {
    Rebuilder::default().rebuild(statement, values)
}

pub fn rebuild_with_dialect(
    dialect: Dialect,
    statement: &str,
    values: &BindValues,
) -> Result<Rebuilt, RebuildError> {
    Rebuilder::new(dialect).rebuild(statement, values)
}
