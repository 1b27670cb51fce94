#[cfg(test)]
mod tests {
    use crate::bind::{BindKey, BindValues};
    use crate::dialect::{Dialect, set_default_dialect_scoped};
    use crate::rebuilder::{RebuildError, Rebuilder, rebuild};
    use crate::rules::{DialectRules, Handler};
    use crate::state::{Region, ScanState};
    use crate::value::{BoundValue, SqlValue};
    use crate::valuer::{SqlValuer, ValuerError};
    use pretty_assertions::assert_eq;

    type Output = (String, Vec<(BindKey, SqlValue)>);

    fn generic(sql: &str, values: &BindValues) -> Result<Output, RebuildError> {
        let out = Rebuilder::new(Dialect::Generic).rebuild(sql, values)?;
        Ok((out.statement, out.values.into_vec()))
    }

    fn name(n: &str) -> BindKey {
        BindKey::from(n)
    }

    #[test]
    fn statements_without_placeholders_are_unchanged() {
        let cases = vec![
            "",
            "SELECT 1",
            "SELECT 'a:b' FROM t -- :c ?\n",
            "SELECT a::int FROM t",
            "SELECT \"x?\" FROM t",
            "SELECT /* :x ? */ 1",
            "SELECT 1 WHERE a = :1 OR b := 2",
            "SELECT '日本:x' -- ü\n",
        ];

        for sql in cases {
            assert_eq!(generic(sql, &BindValues::new()), Ok((sql.to_string(), vec![])));
        }
    }

    #[test]
    fn quoted_placeholders_are_left_alone() {
        let values = crate::bind_values! { "foo" => "bar" };
        assert_eq!(
            generic("SELECT ':foo'", &values),
            Ok(("SELECT ':foo'".to_string(), vec![]))
        );
        assert_eq!(
            generic("SELECT 'it''s :foo', \":foo\", :foo", &values),
            Ok((
                "SELECT 'it''s :foo', \":foo\", :foo".to_string(),
                vec![(name("foo"), "bar".into())]
            ))
        );
    }

    #[test]
    fn named_placeholders() {
        let cases: Vec<(&str, BindValues, &str, Vec<(BindKey, SqlValue)>)> = vec![
            (
                "SELECT :foo",
                crate::bind_values! { "foo" => "bar" },
                "SELECT :foo",
                vec![(name("foo"), "bar".into())],
            ),
            (
                "SELECT :foo AS a, :foo AS b",
                crate::bind_values! { "foo" => "bar" },
                "SELECT :foo AS a, :foo_0 AS b",
                vec![(name("foo"), "bar".into()), (name("foo_0"), "bar".into())],
            ),
            (
                "SELECT :foo",
                crate::bind_values! { "foo" => ["bar", "baz"] },
                "SELECT :foo, :foo_0",
                vec![(name("foo"), "bar".into()), (name("foo_0"), "baz".into())],
            ),
            (
                "SELECT :foo, :foo_0, :foo",
                crate::bind_values! { "foo" => 1_i64, "foo_0" => 2_i64 },
                "SELECT :foo, :foo_0, :foo_1",
                vec![
                    (name("foo"), SqlValue::I64(1)),
                    (name("foo_0"), SqlValue::I64(2)),
                    (name("foo_1"), SqlValue::I64(1)),
                ],
            ),
            (
                "WHERE id IN (:ids)",
                crate::bind_values! { "ids" => Vec::<i64>::new() },
                "WHERE id IN (NULL)",
                vec![],
            ),
            (
                "WHERE a = :a AND b IN (:b)",
                crate::bind_values! { "b" => [true, false], "a" => None::<i64> },
                "WHERE a = :a AND b IN (:b, :b_0)",
                vec![
                    (name("a"), SqlValue::Null),
                    (name("b"), SqlValue::Bool(true)),
                    (name("b_0"), SqlValue::Bool(false)),
                ],
            ),
        ];

        for (sql, values, expected_sql, expected_values) in cases {
            assert_eq!(
                generic(sql, &values),
                Ok((expected_sql.to_string(), expected_values))
            );
        }
    }

    #[test]
    fn numbered_placeholders_are_consumed_left_to_right() {
        let values = BindValues::positional(["bar", "baz"]);
        assert_eq!(
            generic("SELECT ? AS a, ? AS b", &values),
            Ok((
                "SELECT :__1 AS a, :__2 AS b".to_string(),
                vec![(name("__1"), "bar".into()), (name("__2"), "baz".into())]
            ))
        );

        let mut values = BindValues::new();
        values.bind(1, vec![1_i64, 2]).bind(2, "x");
        assert_eq!(
            generic("WHERE id IN (?) AND x = ?", &values),
            Ok((
                "WHERE id IN (:__1, :__2) AND x = :__3".to_string(),
                vec![
                    (name("__1"), SqlValue::I64(1)),
                    (name("__2"), SqlValue::I64(2)),
                    (name("__3"), "x".into()),
                ]
            ))
        );
    }

    #[test]
    fn named_and_numbered_can_mix() {
        let values = crate::bind_values! { "a" => 1_i64, 1 => 2_i64 };
        assert_eq!(
            generic("SELECT :a, ?, :a", &values),
            Ok((
                "SELECT :a, :__1, :a_0".to_string(),
                vec![
                    (name("a"), SqlValue::I64(1)),
                    (name("__1"), SqlValue::I64(2)),
                    (name("a_0"), SqlValue::I64(1)),
                ]
            ))
        );
    }

    #[test]
    fn missing_parameters_fail() {
        let values = BindValues::positional(["x"]);
        assert_eq!(
            generic("SELECT ? OR ?", &values),
            Err(RebuildError::MissingParameter(BindKey::Position(2)))
        );
        assert_eq!(
            generic("SELECT :nope", &values),
            Err(RebuildError::MissingParameter(name("nope")))
        );
    }

    #[test]
    fn nested_block_comments_hide_placeholders() {
        let values = crate::bind_values! { "c" => 1_i64 };
        assert_eq!(
            generic("SELECT /* /* :a */ :b */ :c", &values),
            Ok((
                "SELECT /* /* :a */ :b */ :c".to_string(),
                vec![(name("c"), SqlValue::I64(1))]
            ))
        );
    }

    #[test]
    fn backslash_does_not_escape_in_generic_strings() {
        let values = crate::bind_values! { "foo" => 1_i64 };
        assert_eq!(
            generic("SELECT 'a\\', :foo", &values),
            Ok((
                "SELECT 'a\\', :foo".to_string(),
                vec![(name("foo"), SqlValue::I64(1))]
            ))
        );
    }

    #[test]
    fn unterminated_regions_pass_through_unless_strict() {
        let values = crate::bind_values! { "x" => 1_i64 };
        let cases = vec![
            ("SELECT 'abc :x", Region::SingleQuoted),
            ("SELECT \"abc :x", Region::DoubleQuoted),
            ("SELECT /* :x", Region::BlockComment),
        ];

        for (sql, region) in cases {
            assert_eq!(generic(sql, &values), Ok((sql.to_string(), vec![])));
            assert_eq!(
                Rebuilder::new(Dialect::Generic)
                    .strict(true)
                    .rebuild(sql, &values),
                Err(RebuildError::Unterminated { region, offset: 7 })
            );
        }

        // 行注释到结尾本身就是合法结束
        assert!(
            Rebuilder::new(Dialect::Generic)
                .strict(true)
                .rebuild("SELECT 1 -- :x", &values)
                .is_ok()
        );
    }

    #[test]
    fn rebuild_is_deterministic() {
        let values = crate::bind_values! {
            "a" => [1_i64, 2, 3],
            "b" => "x",
            1 => ["p", "q"],
        };
        let sql = "SELECT :a, :b, ?, :a, :b";
        let first = Rebuilder::new(Dialect::Generic).rebuild(sql, &values);
        let second = Rebuilder::new(Dialect::Generic).rebuild(sql, &values);
        assert_eq!(first, second);
        assert_eq!(
            first.map(|r| r.statement),
            Ok("SELECT :a, :a_0, :a_1, :b, :__1, :__2, :a_2, :a_3, :a_4, :b_0".to_string())
        );
    }

    #[derive(Debug, Clone)]
    struct Lazy(Result<i64, String>);

    impl SqlValuer for Lazy {
        fn value(&self) -> Result<SqlValue, ValuerError> {
            self.0.clone().map(SqlValue::I64).map_err(ValuerError)
        }
    }

    #[test]
    fn valuers_are_evaluated_only_when_consumed() {
        let ok: Box<dyn SqlValuer> = Box::new(Lazy(Ok(5)));
        let broken: Box<dyn SqlValuer> = Box::new(Lazy(Err("boom".into())));
        let mut values = BindValues::new();
        values.bind("ok", ok).bind("broken", broken);

        assert_eq!(
            generic("SELECT :ok -- :broken", &values),
            Ok((
                "SELECT :ok -- :broken".to_string(),
                vec![(name("ok"), SqlValue::I64(5))]
            ))
        );
        assert_eq!(
            generic("SELECT :broken", &values),
            Err(RebuildError::Valuer(ValuerError("boom".into())))
        );
    }

    fn stall(_: &mut ScanState<'_>, _: &DialectRules) -> Result<(), RebuildError> {
        Ok(())
    }

    const STALL_HANDLERS: &[(char, Handler)] = &[('x', stall)];
    static STALLING: DialectRules = DialectRules::new("stalling", STALL_HANDLERS);

    #[test]
    fn handler_without_progress_is_reported() {
        let result = Rebuilder::with_rules(&STALLING).rebuild("abx", &BindValues::new());
        assert_eq!(result, Err(RebuildError::ParserStuck { offset: 2 }));
    }

    #[test]
    fn free_function_uses_default_dialect() {
        let values = BindValues::positional([BoundValue::from("a")]);

        let _g = set_default_dialect_scoped(Dialect::Legacy);
        let out = rebuild("SELECT ?", &values).unwrap();
        assert_eq!(out.statement, "SELECT ?");
        assert_eq!(out.values.get_position(1), Some(&SqlValue::from("a")));
        drop(_g);

        let _g = set_default_dialect_scoped(Dialect::Generic);
        let (sql, finals) = rebuild("SELECT ?", &values).unwrap().into_parts();
        assert_eq!(sql, "SELECT :__1");
        assert_eq!(finals.get_named("__1"), Some(&SqlValue::from("a")));
    }
}
