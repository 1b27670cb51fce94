//! 各方言共用的词法处理函数。
//!
//! 每个处理函数在游标指向触发字符时被调用，负责越过一个完整的词法区域
//! （字符串、标识符、注释、dollar-quote）或完成一次占位符替换。
//! 若触发字符并未真正开启区域，则原样写出该字符。

use crate::bind::BindKey;
use crate::rebuilder::{RebuildError, step};
use crate::rules::{DialectRules, LineComment};
use crate::state::{AnchoredPattern, Region, ScanState};
use std::sync::LazyLock;

static DOLLAR_TAG: LazyLock<AnchoredPattern> = LazyLock::new(|| {
    AnchoredPattern::new(r"\$(?:[A-Za-z_][A-Za-z0-9_]*)?\$").expect("invalid dollar tag pattern")
});

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// 可以出现在数组切片冒号左侧的字符。
fn is_operand_char(c: char) -> bool {
    is_identifier_char(c) || c == ')' || c == ']'
}

/// 越过一个以当前字符开头、以 `close` 结尾的区域；`close` 双写表示转义。
fn quoted_region(
    state: &mut ScanState<'_>,
    close: char,
    backslash_escapes: bool,
    region: Region,
) -> Result<(), RebuildError> {
    let start = state.offset();
    state.copy_current_char();
    while !state.done() {
        let c = state.current_char()?;
        if backslash_escapes && c == '\\' {
            state.copy_chars(2);
            continue;
        }
        if c == close {
            if state.next_char() == Some(close) {
                state.copy_chars(2);
                continue;
            }
            state.copy_current_char();
            return Ok(());
        }
        state.copy_current_char();
    }
    state.unterminated(region, start)
}

pub fn single_quoted(state: &mut ScanState<'_>, rules: &DialectRules) -> Result<(), RebuildError> {
    quoted_region(state, '\'', rules.backslash_escapes, Region::SingleQuoted)
}

pub fn double_quoted(state: &mut ScanState<'_>, rules: &DialectRules) -> Result<(), RebuildError> {
    quoted_region(state, '"', rules.backslash_escapes, Region::DoubleQuoted)
}

/// MySQL 反引号标识符，仅支持双写转义。
pub fn backtick_quoted(state: &mut ScanState<'_>, _: &DialectRules) -> Result<(), RebuildError> {
    quoted_region(state, '`', false, Region::Backtick)
}

/// SQL Server `[name]` 标识符，`]]` 表示一个 `]`。
pub fn bracket_quoted(state: &mut ScanState<'_>, _: &DialectRules) -> Result<(), RebuildError> {
    quoted_region(state, ']', false, Region::Bracket)
}

/// PostgreSQL `E'...'`：只有 E 字符串里反斜杠才是转义符。
pub fn escape_string(state: &mut ScanState<'_>, _: &DialectRules) -> Result<(), RebuildError> {
    let is_prefix =
        state.next_char() == Some('\'') && !state.prev_char().is_some_and(is_identifier_char);
    state.copy_current_char();
    if !is_prefix {
        return Ok(());
    }
    quoted_region(state, '\'', true, Region::SingleQuoted)
}

/// `--` 行注释，写出到行尾（含换行）或结尾。
pub fn line_comment(state: &mut ScanState<'_>, rules: &DialectRules) -> Result<(), RebuildError> {
    let opens = state.next_chars_are("-")
        && match rules.line_comment {
            LineComment::DoubleDash => true,
            LineComment::DoubleDashSpace => state.rest()[2..]
                .chars()
                .next()
                .is_none_or(|c| c.is_whitespace() || c.is_control()),
        };
    if !opens {
        state.copy_current_char();
        return Ok(());
    }
    state.copy_until("\n");
    Ok(())
}

/// MySQL `#` 行注释。
pub fn hash_comment(state: &mut ScanState<'_>, _: &DialectRules) -> Result<(), RebuildError> {
    state.copy_until("\n");
    Ok(())
}

/// `/* ... */` 块注释；是否允许嵌套由方言决定。
pub fn block_comment(state: &mut ScanState<'_>, rules: &DialectRules) -> Result<(), RebuildError> {
    if !state.next_chars_are("*") {
        state.copy_current_char();
        return Ok(());
    }
    let start = state.offset();
    state.copy_chars(2);

    if !rules.nested_comments {
        if state.copy_until("*/") {
            return Ok(());
        }
        return state.unterminated(Region::BlockComment, start);
    }

    let mut depth = 1usize;
    while !state.done() {
        if state.current_chars_are("/*") {
            state.copy_chars(2);
            depth += 1;
        } else if state.current_chars_are("*/") {
            state.copy_chars(2);
            depth -= 1;
            if depth == 0 {
                return Ok(());
            }
        } else {
            state.copy_current_char();
        }
    }
    state.unterminated(Region::BlockComment, start)
}

/// PostgreSQL `$tag$ ... $tag$`。
///
/// 只有后文存在完全相同的结束标签时才算字符串；
/// 否则标签按普通文本写出，继续扫描。
pub fn dollar_quoted(state: &mut ScanState<'_>, _: &DialectRules) -> Result<(), RebuildError> {
    let Some(tag) = state.capture_regex(&DOLLAR_TAG) else {
        state.copy_current_char();
        return Ok(());
    };
    let body_start = state.offset() + tag.len();
    let closed = state.tag_occurs_from('$', &DOLLAR_TAG, tag, body_start);
    state.copy_chars(tag.chars().count());
    if closed {
        state.copy_until(tag);
    }
    Ok(())
}

/// PostgreSQL 数组下标：`arr[lo:hi]` 中紧跟操作数的冒号是切片分隔符。
///
/// 嵌套的 `[` 在本循环内计数，不经过 `step` 递归。
pub fn array_subscript(
    state: &mut ScanState<'_>,
    rules: &DialectRules,
) -> Result<(), RebuildError> {
    state.copy_current_char();
    let mut depth = 1usize;
    while !state.done() {
        match state.current_char()? {
            '[' => {
                state.copy_current_char();
                depth += 1;
            }
            ']' => {
                state.copy_current_char();
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            ':' if state.next_char() != Some(':')
                && state.prev_char().is_some_and(is_operand_char) =>
            {
                state.copy_current_char();
            }
            _ => step(state, rules)?,
        }
    }
    Ok(())
}

/// `:name` 命名占位符；`::` 类型转换与 `:` 后非标识符的情况原样写出。
pub fn colon(state: &mut ScanState<'_>, _: &DialectRules) -> Result<(), RebuildError> {
    match state.next_char() {
        Some(':') => {
            while !state.done() && state.current_char()? == ':' {
                state.copy_current_char();
            }
            Ok(())
        }
        Some(c) if is_identifier_start(c) => named_placeholder(state),
        _ => {
            state.copy_current_char();
            Ok(())
        }
    }
}

fn named_placeholder(state: &mut ScanState<'_>) -> Result<(), RebuildError> {
    state.pass_chars(1);
    let name = state.capture_identifier();
    let value = state
        .get_named_value(name)
        .ok_or_else(|| RebuildError::MissingParameter(BindKey::Name(name.to_string())))?;
    state.pass_chars(name.len());
    state.emit_named(name, value)
}

/// `?` 位置占位符，按出现顺序消费 1, 2, 3 ... 号参数。
pub fn numbered_placeholder(
    state: &mut ScanState<'_>,
    rules: &DialectRules,
) -> Result<(), RebuildError> {
    let value = state.get_next_numbered_value()?;
    state.pass_chars(1);
    state.emit_numbered(value, rules.numbered)
}
