//! ScanState：一次重建过程中的全部可变状态。
//!
//! 记录“读到了哪里、写出了什么、绑定了什么”。游标只进不退，
//! 源语句中的每个字符最终要么被原样写出，要么作为被替换的占位符 token 丢弃。

use crate::bind::{BindKey, BindValues, FinalValues};
use crate::rebuilder::RebuildError;
use crate::rules::NumberedStyle;
use crate::string_builder::StringBuilder;
use crate::value::{BoundValue, SqlValue};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, trace};

/// 可能未闭合的词法区域。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    SingleQuoted,
    DoubleQuoted,
    Backtick,
    Bracket,
    BlockComment,
    DollarQuoted,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::SingleQuoted => "single-quoted string",
            Self::DoubleQuoted => "double-quoted string",
            Self::Backtick => "backtick identifier",
            Self::Bracket => "bracket identifier",
            Self::BlockComment => "block comment",
            Self::DollarQuoted => "dollar-quoted string",
        };
        f.write_str(s)
    }
}

/// 只在游标处尝试匹配的正则。
///
/// 构造时把表达式包进 `^(?:...)`，匹配失败不会继续向后搜索剩余文本。
#[derive(Debug, Clone)]
pub struct AnchoredPattern(Regex);

impl AnchoredPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(&format!("^(?:{pattern})")).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    fn find<'h>(&self, haystack: &'h str) -> Option<&'h str> {
        self.0.find(haystack).map(|m| m.as_str())
    }
}

/// 扫描状态。每次重建新建一个，结束后通过 `finish` 整体交出结果。
#[derive(Debug)]
pub struct ScanState<'a> {
    source: &'a str,
    /// 字节偏移，始终落在字符边界上。
    cursor: usize,
    output: StringBuilder,
    values: &'a BindValues,
    final_values: FinalValues,
    /// 已从原语句中消费的 `?` 个数。
    numbered_cursor: u32,
    /// 为 `?` 生成的最终占位符个数（数组展开后可能多于 `numbered_cursor`）。
    numbered_slots: u32,
    name_use_counts: HashMap<String, usize>,
    used_names: HashSet<String>,
    /// 标签 -> 最后一次出现的字节偏移，首次查询时建立。
    tag_index: Option<HashMap<&'a str, usize>>,
    strict: bool,
}

impl<'a> ScanState<'a> {
    pub fn new(source: &'a str, values: &'a BindValues) -> Self {
        Self {
            source,
            cursor: 0,
            output: StringBuilder::with_capacity(source.len() + values.len() * 8),
            values,
            final_values: FinalValues::new(),
            numbered_cursor: 0,
            numbered_slots: 0,
            name_use_counts: HashMap::new(),
            used_names: HashSet::new(),
            tag_index: None,
            strict: false,
        }
    }

    /// 严格模式下，未闭合的字符串/注释会返回错误而不是原样写出。
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// 当前字节偏移。
    pub fn offset(&self) -> usize {
        self.cursor
    }

    /// 从游标开始的剩余文本。
    pub fn rest(&self) -> &'a str {
        &self.source[self.cursor..]
    }

    pub fn output(&self) -> &str {
        self.output.as_str()
    }

    pub fn done(&self) -> bool {
        self.cursor >= self.source.len()
    }

    pub fn current_char(&self) -> Result<char, RebuildError> {
        self.rest()
            .chars()
            .next()
            .ok_or(RebuildError::OutOfBounds {
                offset: self.cursor,
            })
    }

    /// 游标之后的下一个字符。
    pub fn next_char(&self) -> Option<char> {
        let mut it = self.rest().chars();
        it.next()?;
        it.next()
    }

    /// 游标之前的一个源字符。
    pub fn prev_char(&self) -> Option<char> {
        self.source[..self.cursor].chars().next_back()
    }

    /// 当前字符之后的文本是否以 `s` 开头（不移动游标）。
    pub fn next_chars_are(&self, s: &str) -> bool {
        let rest = self.rest();
        match rest.chars().next() {
            Some(c) => rest[c.len_utf8()..].starts_with(s),
            None => false,
        }
    }

    /// 从当前字符开始的文本是否以 `s` 开头。
    pub fn current_chars_are(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn char_end(&self, n: usize) -> usize {
        self.rest()
            .char_indices()
            .nth(n)
            .map(|(i, _)| self.cursor + i)
            .unwrap_or(self.source.len())
    }

    pub fn copy_current_char(&mut self) {
        if let Some(c) = self.rest().chars().next() {
            self.output.write_char(c);
            self.cursor += c.len_utf8();
        }
    }

    /// 原样写出接下来的 `n` 个字符（遇到结尾则截断）。
    pub fn copy_chars(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        let end = self.char_end(n);
        self.output.write_str(&self.source[self.cursor..end]);
        self.cursor = end;
    }

    /// 跳过接下来的 `n` 个字符，不写出。
    pub fn pass_chars(&mut self, n: usize) {
        self.cursor = self.char_end(n);
    }

    pub fn add_to_output(&mut self, s: &str) {
        self.output.write_str(s);
    }

    /// 写出直到 `marker`（含）为止的文本；找不到时写出剩余全部并返回 `false`。
    pub fn copy_until(&mut self, marker: &str) -> bool {
        let rest = self.rest();
        let (end, found) = match rest.find(marker) {
            Some(i) => (self.cursor + i + marker.len(), true),
            None => (self.source.len(), false),
        };
        self.output.write_str(&self.source[self.cursor..end]);
        self.cursor = end;
        found
    }

    /// 从游标开始捕获最长的 `[A-Za-z0-9_]` 串，不移动游标。
    pub fn capture_identifier(&self) -> &'a str {
        let rest = self.rest();
        let end = rest
            .bytes()
            .position(|b| !(b.is_ascii_alphanumeric() || b == b'_'))
            .unwrap_or(rest.len());
        &rest[..end]
    }

    /// 在游标处做锚定匹配，不移动游标。
    pub fn capture_regex(&self, pattern: &AnchoredPattern) -> Option<&'a str> {
        pattern.find(self.rest())
    }

    /// 偏移 `from`（含）之后源语句中是否还出现标签 `tag`。
    ///
    /// 首次调用时在每个 `marker` 字符处用 `pattern` 做一次锚定匹配，
    /// 记下每个标签最后出现的位置；之后的查询不再扫描文本。
    /// 同一次重建中 `marker` 与 `pattern` 须保持不变。
    pub fn tag_occurs_from(
        &mut self,
        marker: char,
        pattern: &AnchoredPattern,
        tag: &str,
        from: usize,
    ) -> bool {
        let source = self.source;
        let index = self.tag_index.get_or_insert_with(|| {
            let mut index = HashMap::new();
            for (i, _) in source.match_indices(marker) {
                if let Some(found) = pattern.find(&source[i..]) {
                    index.insert(found, i);
                }
            }
            trace!(tags = index.len(), "tag index built");
            index
        });
        index.get(tag).is_some_and(|&last| last >= from)
    }

    /// 分配一个未使用过的最终名称：`base`、`base_0`、`base_1` ...
    pub fn allocate_final_name(&mut self, base: &str) -> String {
        if self.used_names.insert(base.to_string()) {
            return base.to_string();
        }
        let counter = self.name_use_counts.entry(base.to_string()).or_insert(0);
        loop {
            let candidate = format!("{base}_{counter}");
            *counter += 1;
            if self.used_names.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    pub fn bind_final(&mut self, key: BindKey, value: SqlValue) -> Result<(), RebuildError> {
        if self.final_values.contains(&key) {
            return Err(RebuildError::DuplicateBinding(key));
        }
        self.final_values.insert(key, value);
        Ok(())
    }

    pub fn get_named_value(&self, name: &str) -> Option<&'a BoundValue> {
        self.values.get_named(name)
    }

    /// 消费下一个位置参数（从 1 开始编号）。
    pub fn get_next_numbered_value(&mut self) -> Result<&'a BoundValue, RebuildError> {
        self.numbered_cursor += 1;
        let key = BindKey::Position(self.numbered_cursor);
        self.values
            .get(&key)
            .ok_or(RebuildError::MissingParameter(key))
    }

    /// 为命名占位符写出最终占位符并绑定；序列值展开为 `:name, :name_0, ...`。
    pub fn emit_named(&mut self, base: &str, value: &BoundValue) -> Result<(), RebuildError> {
        self.expand(base, value, |state, v| {
            let name = state.allocate_final_name(base);
            state.bind_final(BindKey::Name(name.clone()), v)?;
            Ok(format!(":{name}"))
        })
    }

    /// 为 `?` 写出最终占位符并绑定。
    pub fn emit_numbered(
        &mut self,
        value: &BoundValue,
        style: NumberedStyle,
    ) -> Result<(), RebuildError> {
        let label = format!("?{}", self.numbered_cursor);
        self.expand(&label, value, |state, v| {
            state.numbered_slots += 1;
            match style {
                NumberedStyle::Named => {
                    let name = state.allocate_final_name(&format!("__{}", state.numbered_slots));
                    state.bind_final(BindKey::Name(name.clone()), v)?;
                    Ok(format!(":{name}"))
                }
                NumberedStyle::Positional => {
                    state.bind_final(BindKey::Position(state.numbered_slots), v)?;
                    Ok("?".to_string())
                }
            }
        })
    }

    fn expand<F>(
        &mut self,
        label: &str,
        value: &BoundValue,
        mut slot: F,
    ) -> Result<(), RebuildError>
    where
        F: FnMut(&mut Self, SqlValue) -> Result<String, RebuildError>,
    {
        let scalars = value.resolve()?;
        if scalars.is_empty() {
            // 空列表没有可绑定的值，写出 NULL 让 `IN (...)` 仍然合法
            self.output.write_str("NULL");
            return Ok(());
        }
        if value.is_sequence() {
            trace!(placeholder = label, count = scalars.len(), "expanding sequence value");
        }
        let mut placeholders = Vec::with_capacity(scalars.len());
        for v in scalars {
            placeholders.push(slot(self, v)?);
        }
        self.output.write_joined(&placeholders, ", ");
        Ok(())
    }

    /// 到达结尾仍未闭合：严格模式报错，否则保持已写出的原文。
    pub fn unterminated(&self, region: Region, start: usize) -> Result<(), RebuildError> {
        if self.strict {
            return Err(RebuildError::Unterminated {
                region,
                offset: start,
            });
        }
        debug!(%region, offset = start, "unterminated region copied through");
        Ok(())
    }

    pub fn finish(self) -> (String, FinalValues) {
        (self.output.into_string(), self.final_values)
    }
}
