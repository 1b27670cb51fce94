//! 绑定值类型：标量 `SqlValue` 与调用方传入的 `BoundValue`（标量或序列）。

use crate::valuer::SqlValuer;
use std::borrow::Cow;

/// 最终交给驱动 bind 的标量值。
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    String(Cow<'static, str>),
    Bytes(Vec<u8>),
    DateTime(SqlDateTime),
}

/// 时间值。
///
/// `tz_abbr` 随值原样交给驱动，重建过程不读取也不改写它。
#[derive(Debug, Clone, PartialEq)]
pub struct SqlDateTime {
    pub dt: time::OffsetDateTime,
    pub tz_abbr: Option<Cow<'static, str>>,
}

impl SqlDateTime {
    pub fn new(dt: time::OffsetDateTime) -> Self {
        Self { dt, tz_abbr: None }
    }

    pub fn with_tz_abbr(mut self, abbr: impl Into<Cow<'static, str>>) -> Self {
        self.tz_abbr = Some(abbr.into());
        self
    }
}

impl SqlValue {
    /// `None => Null`，`Some(v) => v.into()`。
    pub fn from_option<T: Into<SqlValue>>(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

macro_rules! impl_sql_value_from {
    ($($ty:ty => |$v:ident| $body:expr),+ $(,)?) => {
        $(
            impl From<$ty> for SqlValue {
                fn from($v: $ty) -> Self {
                    $body
                }
            }
        )+
    };
}

impl_sql_value_from! {
    () => |_v| SqlValue::Null,
    bool => |v| SqlValue::Bool(v),
    i8 => |v| SqlValue::I64(v as i64),
    i16 => |v| SqlValue::I64(v as i64),
    i32 => |v| SqlValue::I64(v as i64),
    i64 => |v| SqlValue::I64(v),
    u8 => |v| SqlValue::U64(v as u64),
    u16 => |v| SqlValue::U64(v as u64),
    u32 => |v| SqlValue::U64(v as u64),
    u64 => |v| SqlValue::U64(v),
    f32 => |v| SqlValue::F64(v as f64),
    f64 => |v| SqlValue::F64(v),
    String => |v| SqlValue::String(Cow::Owned(v)),
    &'static str => |v| SqlValue::String(Cow::Borrowed(v)),
    time::OffsetDateTime => |v| SqlValue::DateTime(SqlDateTime::new(v)),
    SqlDateTime => |v| SqlValue::DateTime(v),
}

/// 调用方为某个占位符提供的值。
///
/// - `Scalar`：普通值，替换为一个最终占位符；
/// - `Sequence`：列表值（用于 `IN (...)`），每个元素各占一个最终占位符；
/// - `Valuer`：延迟计算的标量，只有占位符真正被消费时才会求值。
///
/// 注意：`Vec<T>` 与数组会转换为 `Sequence`（包括 `Vec<u8>`）；
/// 二进制数据请显式使用 `SqlValue::Bytes`。
#[derive(Debug, Clone)]
pub enum BoundValue {
    Scalar(SqlValue),
    Sequence(Vec<SqlValue>),
    Valuer(Box<dyn SqlValuer>),
}

impl BoundValue {
    pub fn is_sequence(&self) -> bool {
        matches!(self, Self::Sequence(_))
    }

    /// 把值拆解成待绑定的标量列表；标量与 valuer 恒为一个元素。
    pub(crate) fn resolve(&self) -> Result<Vec<SqlValue>, crate::valuer::ValuerError> {
        match self {
            Self::Scalar(v) => Ok(vec![v.clone()]),
            Self::Sequence(items) => Ok(items.clone()),
            Self::Valuer(v) => Ok(vec![v.value()?]),
        }
    }
}

impl PartialEq for BoundValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => a == b,
            (Self::Sequence(a), Self::Sequence(b)) => a == b,
            // valuer 没有可比较的身份，只能按求值结果比较
            (Self::Valuer(a), Self::Valuer(b)) => match (a.value(), b.value()) {
                (Ok(x), Ok(y)) => x == y,
                _ => false,
            },
            _ => false,
        }
    }
}

macro_rules! impl_bound_value_from_scalar {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for BoundValue {
                fn from(v: $ty) -> Self {
                    Self::Scalar(v.into())
                }
            }
        )+
    };
}

impl_bound_value_from_scalar!(
    (),
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    String,
    &'static str,
    time::OffsetDateTime,
    SqlDateTime,
    SqlValue,
);

impl<T: Into<SqlValue>> From<Option<T>> for BoundValue {
    fn from(v: Option<T>) -> Self {
        Self::Scalar(SqlValue::from_option(v))
    }
}

impl<T: Into<SqlValue>> From<Vec<T>> for BoundValue {
    fn from(v: Vec<T>) -> Self {
        Self::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<SqlValue>, const N: usize> From<[T; N]> for BoundValue {
    fn from(v: [T; N]) -> Self {
        Self::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl From<Box<dyn SqlValuer>> for BoundValue {
    fn from(v: Box<dyn SqlValuer>) -> Self {
        Self::Valuer(v)
    }
}

#[cfg(test)]
mod tests {
    use super::{BoundValue, SqlDateTime, SqlValue};
    use pretty_assertions::assert_eq;
    use time::macros::datetime;

    #[test]
    fn from_option_some() {
        assert_eq!(SqlValue::from_option(Some(123_i64)), SqlValue::I64(123));
    }

    #[test]
    fn from_option_none() {
        assert_eq!(SqlValue::from_option::<i64>(None), SqlValue::Null);
        assert!(SqlValue::from_option::<i64>(None).is_null());
    }

    #[test]
    fn bound_value_from_scalar_and_list() {
        assert_eq!(BoundValue::from("abc"), BoundValue::Scalar("abc".into()));
        assert_eq!(
            BoundValue::from(vec![1_i64, 2]),
            BoundValue::Sequence(vec![SqlValue::I64(1), SqlValue::I64(2)])
        );
        assert_eq!(
            BoundValue::from(["a", "b"]),
            BoundValue::Sequence(vec!["a".into(), "b".into()])
        );
        assert!(BoundValue::from(Vec::<i64>::new()).is_sequence());
    }

    #[test]
    fn bound_value_option_is_scalar() {
        assert_eq!(
            BoundValue::from(None::<&'static str>),
            BoundValue::Scalar(SqlValue::Null)
        );
    }

    #[test]
    fn datetime_zone_abbreviation_passes_through() {
        let dt = datetime!(2019-04-24 12:23:34 +08:00);
        let values = crate::bind_values! { "at" => SqlDateTime::new(dt).with_tz_abbr("CST") };
        let out = crate::Rebuilder::new(crate::Dialect::Generic)
            .rebuild("SELECT * FROM t WHERE at > :at", &values)
            .unwrap();
        match out.values.get_named("at") {
            Some(SqlValue::DateTime(d)) => {
                assert_eq!(d.dt, dt);
                assert_eq!(d.tz_abbr.as_deref(), Some("CST"));
            }
            other => panic!("unexpected value {other:?}"),
        }
    }
}
