//! DialectRules：方言规则表。
//!
//! 每个方言就是一张“触发字符 -> 处理函数”的表，加上几项词法策略；
//! 扫描主循环只有一份，新增方言只需提供一张新表。

use crate::handlers;
use crate::rebuilder::RebuildError;
use crate::state::ScanState;
use std::fmt;

/// 处理函数：从游标处的触发字符开始，至少前进一个字符。
pub type Handler = fn(&mut ScanState<'_>, &DialectRules) -> Result<(), RebuildError>;

/// `?` 占位符重建后的形式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberedStyle {
    /// 改写为 `:__1, :__2, ...` 命名占位符。
    #[default]
    Named,
    /// 保留 `?`，最终参数按 1, 2, 3 ... 位置绑定。
    Positional,
}

/// `--` 行注释的识别规则。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineComment {
    /// `--` 即开始注释。
    #[default]
    DoubleDash,
    /// `--` 之后必须是空白或结尾（MySQL 语法）。
    DoubleDashSpace,
}

#[derive(Clone, Copy)]
pub struct DialectRules {
    pub name: &'static str,
    handlers: &'static [(char, Handler)],
    /// 引号字符串内反斜杠转义下一个字符。
    pub backslash_escapes: bool,
    /// 块注释可嵌套：`/* /* */ */` 是一个注释。
    pub nested_comments: bool,
    pub line_comment: LineComment,
    pub numbered: NumberedStyle,
}

impl DialectRules {
    pub const fn new(name: &'static str, handlers: &'static [(char, Handler)]) -> Self {
        Self {
            name,
            handlers,
            backslash_escapes: false,
            nested_comments: true,
            line_comment: LineComment::DoubleDash,
            numbered: NumberedStyle::Named,
        }
    }

    pub const fn backslash_escapes(mut self, on: bool) -> Self {
        self.backslash_escapes = on;
        self
    }

    pub const fn nested_comments(mut self, on: bool) -> Self {
        self.nested_comments = on;
        self
    }

    pub const fn line_comment(mut self, rule: LineComment) -> Self {
        self.line_comment = rule;
        self
    }

    pub const fn numbered(mut self, style: NumberedStyle) -> Self {
        self.numbered = style;
        self
    }

    pub fn handler_for(&self, c: char) -> Option<Handler> {
        self.handlers
            .iter()
            .find_map(|&(t, h)| if t == c { Some(h) } else { None })
    }
}

impl fmt::Debug for DialectRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let triggers: String = self.handlers.iter().map(|&(c, _)| c).collect();
        f.debug_struct("DialectRules")
            .field("name", &self.name)
            .field("triggers", &triggers)
            .field("backslash_escapes", &self.backslash_escapes)
            .field("nested_comments", &self.nested_comments)
            .field("line_comment", &self.line_comment)
            .field("numbered", &self.numbered)
            .finish()
    }
}

const GENERIC_HANDLERS: &[(char, Handler)] = &[
    ('\'', handlers::single_quoted),
    ('"', handlers::double_quoted),
    ('-', handlers::line_comment),
    ('/', handlers::block_comment),
    (':', handlers::colon),
    ('?', handlers::numbered_placeholder),
];

const MYSQL_HANDLERS: &[(char, Handler)] = &[
    ('\'', handlers::single_quoted),
    ('"', handlers::double_quoted),
    ('`', handlers::backtick_quoted),
    ('-', handlers::line_comment),
    ('#', handlers::hash_comment),
    ('/', handlers::block_comment),
    (':', handlers::colon),
    ('?', handlers::numbered_placeholder),
];

const POSTGRES_HANDLERS: &[(char, Handler)] = &[
    ('\'', handlers::single_quoted),
    ('"', handlers::double_quoted),
    ('E', handlers::escape_string),
    ('e', handlers::escape_string),
    ('$', handlers::dollar_quoted),
    ('[', handlers::array_subscript),
    ('-', handlers::line_comment),
    ('/', handlers::block_comment),
    (':', handlers::colon),
    ('?', handlers::numbered_placeholder),
];

const SQLSERVER_HANDLERS: &[(char, Handler)] = &[
    ('\'', handlers::single_quoted),
    ('"', handlers::double_quoted),
    ('[', handlers::bracket_quoted),
    ('-', handlers::line_comment),
    ('/', handlers::block_comment),
    (':', handlers::colon),
    ('?', handlers::numbered_placeholder),
];

/// 通用规则（SQLite 同此）：引号靠双写转义，块注释可嵌套。
pub static GENERIC: DialectRules = DialectRules::new("generic", GENERIC_HANDLERS);

pub static MYSQL: DialectRules = DialectRules::new("mysql", MYSQL_HANDLERS)
    .backslash_escapes(true)
    .nested_comments(false)
    .line_comment(LineComment::DoubleDashSpace);

pub static POSTGRES: DialectRules = DialectRules::new("pgsql", POSTGRES_HANDLERS);

pub static SQLSERVER: DialectRules = DialectRules::new("sqlsrv", SQLSERVER_HANDLERS);

/// 旧版规则：占位符语义与通用规则一致，但 `?` 保持位置参数形式，字符串内允许反斜杠转义。
pub static LEGACY: DialectRules = DialectRules::new("legacy", GENERIC_HANDLERS)
    .backslash_escapes(true)
    .numbered(NumberedStyle::Positional);
