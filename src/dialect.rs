//! Dialect：内置方言，以及进程级默认方言。

use crate::rules::{self, DialectRules};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    #[default]
    Generic,
    SQLite,
    MySQL,
    PostgreSQL,
    SQLServer,
    /// 通用语义，但 `?` 保留为位置参数。
    Legacy,
}

static DEFAULT_DIALECT: AtomicU8 = AtomicU8::new(Dialect::Generic as u8);
static DEFAULT_DIALECT_LOCK: Mutex<()> = Mutex::new(());

impl Dialect {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Generic,
            1 => Self::SQLite,
            2 => Self::MySQL,
            3 => Self::PostgreSQL,
            4 => Self::SQLServer,
            5 => Self::Legacy,
            _ => Self::Generic,
        }
    }

    fn to_u8(self) -> u8 {
        self as u8
    }

    /// 该方言使用的规则表。
    pub fn rules(self) -> &'static DialectRules {
        match self {
            Self::Generic | Self::SQLite => &rules::GENERIC,
            Self::MySQL => &rules::MYSQL,
            Self::PostgreSQL => &rules::POSTGRES,
            Self::SQLServer => &rules::SQLSERVER,
            Self::Legacy => &rules::LEGACY,
        }
    }
}

/// 获取当前全局默认方言。
pub fn default_dialect() -> Dialect {
    Dialect::from_u8(DEFAULT_DIALECT.load(Ordering::Relaxed))
}

/// 设置全局默认方言，返回旧值。
pub fn set_default_dialect(dialect: Dialect) -> Dialect {
    let old = DEFAULT_DIALECT.swap(dialect.to_u8(), Ordering::Relaxed);
    Dialect::from_u8(old)
}

/// 修改全局默认方言的 RAII guard（持有全局锁，避免并行测试互相干扰）。
pub struct DefaultDialectGuard {
    _lock: MutexGuard<'static, ()>,
    old: Dialect,
}

impl Drop for DefaultDialectGuard {
    fn drop(&mut self) {
        set_default_dialect(self.old);
    }
}

/// 在一个作用域内临时设置默认方言，退出作用域后自动恢复。
pub fn set_default_dialect_scoped(dialect: Dialect) -> DefaultDialectGuard {
    let lock = DEFAULT_DIALECT_LOCK
        .lock()
        .unwrap_or_else(|e| e.into_inner());
    let old = set_default_dialect(dialect);
    DefaultDialectGuard { _lock: lock, old }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Generic => "Generic",
            Self::SQLite => "SQLite",
            Self::MySQL => "MySQL",
            Self::PostgreSQL => "PostgreSQL",
            Self::SQLServer => "SQLServer",
            Self::Legacy => "Legacy",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("rebuild unknown dialect {0:?}")]
pub struct DialectParseError(pub String);

/// 按驱动名解析（不区分大小写），如 `mysql`、`pgsql`、`sqlite`、`sqlsrv`。
impl FromStr for Dialect {
    type Err = DialectParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" | "" => Ok(Self::Generic),
            "sqlite" | "sqlite3" => Ok(Self::SQLite),
            "mysql" | "mariadb" => Ok(Self::MySQL),
            "pgsql" | "postgres" | "postgresql" => Ok(Self::PostgreSQL),
            "sqlsrv" | "mssql" | "sqlserver" | "dblib" => Ok(Self::SQLServer),
            "legacy" => Ok(Self::Legacy),
            _ => Err(DialectParseError(s.to_string())),
        }
    }
}
