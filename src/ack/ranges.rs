//! ACK range 文本编码解析
//!
//! 语法（任意位置允许空白）：
//!
//! ```text
//! input := items?
//! items := item ( ','? item )*
//! item  := '[' ( ints | items )? ']'
//! ints  := int ( ',' int )*
//! ```
//!
//! 只含整数的 item 是一个 group：单个整数表示 `[n,n]`，偶数个整数按 `min,max` 成对读取。
//! 嵌套 item（如 `[[1,2],[5]]`）只是容器，会被展平。

use crate::error::AnnotateError;
use serde_json::Value;
use std::collections::BTreeSet;

/// 容器括号的最大嵌套层数（不含 group 本身）
const MAX_NESTING: usize = 3;

/// QUIC packet number 上限（2^62 - 1）
pub const MAX_PACKET_NUMBER: u64 = (1 << 62) - 1;

/// 单个 `min,max` 对最多展开的 packet 数
pub const MAX_RANGE_SPAN: u64 = 1 << 24;

/// 一个 received 事件的 ACK range 解码结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AckRanges {
    /// 展开为成对形式后的边界列表，顺序与输入一致
    boundaries: Vec<u64>,
    /// 所有被覆盖的 packet number
    expanded: BTreeSet<u64>,
}

impl AckRanges {
    /// 解析文本编码。空串、纯空白、`[]` 得到空结果。
    pub fn parse(raw: &str) -> Result<Self, AnnotateError> {
        let groups = Parser::new(raw).parse().map_err(|f| f.into_error())?;

        let mut boundaries = Vec::new();
        for group in groups {
            match group.len() {
                1 => boundaries.extend([group[0], group[0]]),
                n if n % 2 == 0 => boundaries.extend(group),
                n => {
                    return Err(AnnotateError::OddAckRangeBoundaries { index: 0, count: n });
                }
            }
        }

        let mut expanded = BTreeSet::new();
        for pair in boundaries.chunks_exact(2) {
            // min > max 时不覆盖任何 packet
            expanded.extend(pair[0]..=pair[1]);
        }

        Ok(Self {
            boundaries,
            expanded,
        })
    }

    /// 从 JSON 字段解码：缺失/null 为空，字符串按文本解析，原生数组按其紧凑 JSON 文本解析
    pub fn from_value(value: Option<&Value>) -> Result<Self, AnnotateError> {
        match value {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(Value::String(raw)) => Self::parse(raw),
            Some(v @ Value::Array(_)) => Self::parse(&v.to_string()),
            Some(other) => Err(AnnotateError::MalformedAckRanges {
                index: 0,
                offset: 0,
                reason: format!("expected string or array, got {other}"),
            }),
        }
    }

    pub fn boundaries(&self) -> &[u64] {
        &self.boundaries
    }

    pub fn expanded(&self) -> &BTreeSet<u64> {
        &self.expanded
    }

    /// 所有 range 中的最大 packet number；没有 range 时为 0
    pub fn max(&self) -> u64 {
        self.boundaries.iter().copied().max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }

    /// 按 `(min, max)` 成对迭代
    pub fn pairs(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.boundaries.chunks_exact(2).map(|p| (p[0], p[1]))
    }
}

#[derive(Debug)]
struct ParseFailure {
    offset: usize,
    reason: &'static str,
}

impl ParseFailure {
    fn into_error(self) -> AnnotateError {
        AnnotateError::MalformedAckRanges {
            index: 0,
            offset: self.offset,
            reason: self.reason.to_string(),
        }
    }
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            bytes: raw.as_bytes(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<Vec<Vec<u64>>, ParseFailure> {
        let mut groups = Vec::new();
        self.skip_ws();
        if self.peek().is_none() {
            return Ok(groups);
        }
        self.items(0, &mut groups)?;
        self.skip_ws();
        if self.peek().is_some() {
            return Err(self.fail("unexpected trailing characters"));
        }
        Ok(groups)
    }

    fn items(&mut self, depth: usize, out: &mut Vec<Vec<u64>>) -> Result<(), ParseFailure> {
        loop {
            self.item(depth, out)?;
            self.skip_ws();
            let comma = self.eat(b',');
            self.skip_ws();
            if self.peek() != Some(b'[') {
                if comma {
                    return Err(self.fail("expected `[` after `,`"));
                }
                return Ok(());
            }
        }
    }

    fn item(&mut self, depth: usize, out: &mut Vec<Vec<u64>>) -> Result<(), ParseFailure> {
        if depth > MAX_NESTING {
            return Err(self.fail("brackets nested too deeply"));
        }
        self.expect(b'[')?;
        self.skip_ws();
        match self.peek() {
            Some(b']') => {
                self.pos += 1;
                Ok(())
            }
            Some(b'[') => {
                self.items(depth + 1, out)?;
                self.skip_ws();
                self.expect(b']')
            }
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                let group = self.ints()?;
                if group.len() % 2 == 0
                    && group
                        .chunks_exact(2)
                        .any(|p| p[1].saturating_sub(p[0]) >= MAX_RANGE_SPAN)
                {
                    return Err(ParseFailure {
                        offset: start,
                        reason: "range covers too many packet numbers",
                    });
                }
                self.expect(b']')?;
                out.push(group);
                Ok(())
            }
            _ => Err(self.fail("expected integer or `[`")),
        }
    }

    fn ints(&mut self) -> Result<Vec<u64>, ParseFailure> {
        let mut group = vec![self.int()?];
        loop {
            self.skip_ws();
            if !self.eat(b',') {
                return Ok(group);
            }
            self.skip_ws();
            group.push(self.int()?);
        }
    }

    fn int(&mut self) -> Result<u64, ParseFailure> {
        let start = self.pos;
        let mut value: u64 = 0;
        while let Some(c) = self.peek().filter(u8::is_ascii_digit) {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(u64::from(c - b'0')))
                .ok_or(ParseFailure {
                    offset: start,
                    reason: "packet number overflows u64",
                })?;
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.fail("expected integer"));
        }
        if value > MAX_PACKET_NUMBER {
            return Err(ParseFailure {
                offset: start,
                reason: "packet number exceeds 2^62-1",
            });
        }
        Ok(value)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), ParseFailure> {
        if self.eat(byte) {
            Ok(())
        } else if byte == b']' {
            Err(self.fail("expected `]`"))
        } else {
            Err(self.fail("expected `[`"))
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn fail(&self, reason: &'static str) -> ParseFailure {
        ParseFailure {
            offset: self.pos,
            reason,
        }
    }
}
