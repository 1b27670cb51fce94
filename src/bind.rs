//! 绑定键与参数表。
//!
//! - [`BindValues`]：调用方传入的 `占位符 -> BoundValue`，键为名称或从 1 开始的位置；
//! - [`FinalValues`]：重建后交给驱动的 `最终占位符 -> SqlValue`，按占位符消费顺序排列。

use crate::value::{BoundValue, SqlValue};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

/// 占位符键：名称（`:name`）或从 1 开始的位置（`?`）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BindKey {
    Name(String),
    Position(u32),
}

impl BindKey {
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Name(n) => Some(n),
            Self::Position(_) => None,
        }
    }

    pub fn position(&self) -> Option<u32> {
        match self {
            Self::Name(_) => None,
            Self::Position(p) => Some(*p),
        }
    }
}

impl fmt::Display for BindKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(n) => write!(f, ":{n}"),
            Self::Position(p) => write!(f, "#{p}"),
        }
    }
}

impl From<&str> for BindKey {
    fn from(v: &str) -> Self {
        Self::Name(v.strip_prefix(':').unwrap_or(v).to_string())
    }
}

impl From<String> for BindKey {
    fn from(v: String) -> Self {
        match v.strip_prefix(':') {
            Some(rest) => Self::Name(rest.to_string()),
            None => Self::Name(v),
        }
    }
}

impl From<u32> for BindKey {
    fn from(v: u32) -> Self {
        Self::Position(v)
    }
}

/// 位置从 1 开始。0、负数以及超出 `u32` 的值统一映射为 `Position(0)`，
/// 这个键不是合法位置，[`BindValues::bind`] 会丢弃它，[`BindValues::try_bind`] 会报错。
impl From<i32> for BindKey {
    fn from(v: i32) -> Self {
        Self::Position(u32::try_from(v).unwrap_or(0))
    }
}

impl From<usize> for BindKey {
    fn from(v: usize) -> Self {
        Self::Position(u32::try_from(v).unwrap_or(0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    #[error("rebuild bind position must be in 1..={max}", max = u32::MAX)]
    InvalidPosition,
}

/// 调用方提供的参数表，保持插入顺序。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindValues {
    entries: Vec<(BindKey, BoundValue)>,
    index: HashMap<BindKey, usize>,
}

impl BindValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// 依次编号为 1, 2, 3 ... 的位置参数。
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<BoundValue>,
    {
        let mut out = Self::new();
        for (i, v) in values.into_iter().enumerate() {
            let Some(position) = i.checked_add(1).and_then(|p| u32::try_from(p).ok()) else {
                warn!(count = i, "positional values beyond u32::MAX dropped");
                break;
            };
            out.insert(BindKey::Position(position), v.into());
        }
        out
    }

    /// 绑定一个值；同一个键再次绑定会覆盖旧值但保留原位置。
    ///
    /// `Position(0)` 不是合法位置，会被丢弃并记一条 `warn` 日志；需要显式报错时用 [`Self::try_bind`]。
    pub fn bind(&mut self, key: impl Into<BindKey>, value: impl Into<BoundValue>) -> &mut Self {
        let key = key.into();
        if key == BindKey::Position(0) {
            warn!("bind position 0 ignored; positions start at 1");
            return self;
        }
        self.insert(key, value.into());
        self
    }

    /// 与 [`Self::bind`] 相同，但非法位置返回 [`BindError::InvalidPosition`]。
    pub fn try_bind(
        &mut self,
        key: impl Into<BindKey>,
        value: impl Into<BoundValue>,
    ) -> Result<&mut Self, BindError> {
        let key = key.into();
        if key == BindKey::Position(0) {
            return Err(BindError::InvalidPosition);
        }
        self.insert(key, value.into());
        Ok(self)
    }

    fn insert(&mut self, key: BindKey, value: BoundValue) {
        if let Some(&i) = self.index.get(&key) {
            self.entries[i].1 = value;
        } else {
            self.index.insert(key.clone(), self.entries.len());
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &BindKey) -> Option<&BoundValue> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn get_named(&self, name: &str) -> Option<&BoundValue> {
        self.get(&BindKey::Name(name.to_string()))
    }

    pub fn get_position(&self, position: u32) -> Option<&BoundValue> {
        self.get(&BindKey::Position(position))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BindKey, &BoundValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl<K, V> FromIterator<(K, V)> for BindValues
where
    K: Into<BindKey>,
    V: Into<BoundValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut out = Self::new();
        for (k, v) in iter {
            out.bind(k, v);
        }
        out
    }
}

/// 重建结果中的参数表：键唯一，顺序即占位符在语句中从左到右的出现顺序。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinalValues {
    entries: Vec<(BindKey, SqlValue)>,
    index: HashMap<BindKey, usize>,
}

impl FinalValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个最终绑定；键已存在时返回 `false` 且不做修改。
    pub(crate) fn insert(&mut self, key: BindKey, value: SqlValue) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        true
    }

    pub fn contains(&self, key: &BindKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &BindKey) -> Option<&SqlValue> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn get_named(&self, name: &str) -> Option<&SqlValue> {
        self.get(&BindKey::Name(name.to_string()))
    }

    pub fn get_position(&self, position: u32) -> Option<&SqlValue> {
        self.get(&BindKey::Position(position))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &BindKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BindKey, &SqlValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn to_vec(&self) -> Vec<(BindKey, SqlValue)> {
        self.entries.clone()
    }

    pub fn into_vec(self) -> Vec<(BindKey, SqlValue)> {
        self.entries
    }
}

impl IntoIterator for FinalValues {
    type Item = (BindKey, SqlValue);
    type IntoIter = std::vec::IntoIter<(BindKey, SqlValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
