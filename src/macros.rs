//! 宏集合：用字面量形式构造参数表。

/// 构造 [`BindValues`](crate::BindValues)。
///
/// 键可以是名称（`"foo"` 或 `":foo"`）或从 1 开始的位置（`1`、`2` ...），
/// 值为任意可转换为 [`BoundValue`](crate::BoundValue) 的类型；数组/`Vec` 会作为列表展开。
///
/// ```
/// use halo_space::{bind_values, BindKey};
///
/// let values = bind_values! { "id" => 1_i64, "tags" => ["a", "b"], 1 => "x" };
/// assert_eq!(values.len(), 3);
/// assert!(values.get(&BindKey::Position(1)).is_some());
/// ```
#[macro_export]
macro_rules! bind_values {
    () => {
        $crate::BindValues::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut values = $crate::BindValues::new();
        $(
            values.bind($key, $value);
        )+
        values
    }};
}
