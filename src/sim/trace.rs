use std::fs;
use std::path::Path;

use anyhow::{bail, Context};

use crate::coherence::TileId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceOp {
    Read,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    pub op: TraceOp,
    pub addr: u64,
    pub tile: TileId,
}

fn parse_u64(token: &str) -> anyhow::Result<u64> {
    let parsed = match token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => token.parse::<u64>(),
    };
    parsed.with_context(|| format!("bad number '{}'", token))
}

/// `<r|w> <addr> [tile]`, `#` starts a comment. Returns `None` for blank lines.
fn parse_line(line: &str) -> anyhow::Result<Option<TraceRecord>> {
    let line = line.split('#').next().unwrap_or("").trim();
    if line.is_empty() {
        return Ok(None);
    }

    let mut tokens = line.split_whitespace();
    let op = match tokens.next() {
        Some("r") | Some("R") => TraceOp::Read,
        Some("w") | Some("W") => TraceOp::Write,
        Some(other) => bail!("unknown trace op '{}', expected r or w", other),
        None => unreachable!("line is not empty"),
    };
    let addr = match tokens.next() {
        Some(token) => parse_u64(token)?,
        None => bail!("missing address"),
    };
    let tile = match tokens.next() {
        Some(token) => parse_u64(token)? as TileId,
        None => 0,
    };
    if let Some(extra) = tokens.next() {
        bail!("unexpected trailing token '{}'", extra);
    }

    Ok(Some(TraceRecord { op, addr, tile }))
}

pub fn parse_trace(text: &str) -> anyhow::Result<Vec<TraceRecord>> {
    let mut records = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        if let Some(record) = parse_line(line).with_context(|| format!("trace line {}", lineno + 1))? {
            records.push(record);
        }
    }
    Ok(records)
}

pub fn load_trace(path: &Path) -> anyhow::Result<Vec<TraceRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read trace file {}", path.display()))?;
    parse_trace(&text).with_context(|| format!("in trace file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ops_addresses_and_tiles() {
        let records = parse_trace("# warmup\nr 0x40\nW 128 3  # store\n\n").unwrap();
        assert_eq!(
            records,
            vec![
                TraceRecord { op: TraceOp::Read, addr: 0x40, tile: 0 },
                TraceRecord { op: TraceOp::Write, addr: 128, tile: 3 },
            ]
        );
    }

    #[test]
    fn reports_line_of_bad_record() {
        let err = parse_trace("r 0x0\nx 0x40\n").unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("trace line 2"), "{}", msg);
        assert!(msg.contains("unknown trace op 'x'"), "{}", msg);
    }

    #[test]
    fn rejects_missing_address_and_garbage() {
        assert!(parse_trace("r\n").is_err());
        assert!(parse_trace("r 0xzz\n").is_err());
        assert!(parse_trace("r 1 2 3\n").is_err());
    }
}
