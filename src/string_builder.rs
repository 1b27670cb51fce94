//! 只追加的输出缓冲区：保存重建过程中已经写出的语句文本。

#[derive(Debug, Default, Clone)]
pub(crate) struct StringBuilder {
    buf: String,
}

impl StringBuilder {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            buf: String::with_capacity(n),
        }
    }

    pub(crate) fn write_str(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    pub(crate) fn write_char(&mut self, c: char) {
        self.buf.push(c);
    }

    /// 以 `sep` 连接 `items` 写入，空串会被跳过。
    pub(crate) fn write_joined(&mut self, items: &[String], sep: &str) {
        let mut first_added = false;
        for s in items {
            if s.is_empty() {
                continue;
            }
            if first_added {
                self.buf.push_str(sep);
            }
            self.buf.push_str(s);
            first_added = true;
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.buf
    }

    pub(crate) fn into_string(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::StringBuilder;
    use pretty_assertions::assert_eq;

    #[test]
    fn write_joined_skips_empty() {
        let mut sb = StringBuilder::with_capacity(16);
        sb.write_str("IN (");
        sb.write_joined(&[":a".into(), String::new(), ":b".into()], ", ");
        sb.write_char(')');
        assert_eq!(sb.as_str(), "IN (:a, :b)");
        assert_eq!(sb.into_string(), "IN (:a, :b)");
    }
}
