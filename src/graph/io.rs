//! Graph loaders and writers.
//!
//! Two on-disk formats:
//!
//! - **Binary** (`.dat`): `u64` neighbor count, `u64` offsets count, the neighbor
//!   array (`u32` each), then the offsets array (`u64` each). The format carries
//!   no endianness marker; files are written in the producing host's order, so
//!   [`load_binary`] decodes [`ByteOrder::Native`]. Decoding is explicit and
//!   bounds checked, never a reinterpretation of the raw bytes.
//! - **Text** (`.txt`): one decimal, 1-based cumulative offset per line, a line
//!   containing exactly `-----`, then one decimal, 1-based neighbor id per line.
//!   Every value is shifted down by one on load.
//!
//! Both loaders validate the result with [`CsrGraph::try_from_csr_parts`]; a
//! malformed file yields a [`GraphError`] and no graph.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::{debug, info};

use super::{error::GraphResult, CsrGraph, GraphError, Node};

/// Line separating the offsets block from the neighbors block in text files.
pub const TEXT_SEPARATOR: &str = "-----";

/// Integer encoding of the binary format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Little-endian.
    Little,
    /// Big-endian.
    Big,
    /// Whatever the running host uses.
    #[default]
    Native,
}

impl ByteOrder {
    fn u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
            ByteOrder::Native => u32::from_ne_bytes(bytes),
        }
    }

    fn u64(self, bytes: [u8; 8]) -> u64 {
        match self {
            ByteOrder::Little => u64::from_le_bytes(bytes),
            ByteOrder::Big => u64::from_be_bytes(bytes),
            ByteOrder::Native => u64::from_ne_bytes(bytes),
        }
    }

    fn u32_bytes(self, v: u32) -> [u8; 4] {
        match self {
            ByteOrder::Little => v.to_le_bytes(),
            ByteOrder::Big => v.to_be_bytes(),
            ByteOrder::Native => v.to_ne_bytes(),
        }
    }

    fn u64_bytes(self, v: u64) -> [u8; 8] {
        match self {
            ByteOrder::Little => v.to_le_bytes(),
            ByteOrder::Big => v.to_be_bytes(),
            ByteOrder::Native => v.to_ne_bytes(),
        }
    }
}

/// Loads a graph, picking the format from the file extension.
pub fn load(path: impl AsRef<Path>) -> GraphResult<CsrGraph> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some("dat") => load_binary(path),
        Some("txt") => load_text(path),
        _ => Err(GraphError::UnknownFormat(path.to_path_buf())),
    }
}

/// Loads a binary graph file in the host's byte order.
pub fn load_binary(path: impl AsRef<Path>) -> GraphResult<CsrGraph> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading binary graph");
    let graph = read_binary(BufReader::new(File::open(path)?), ByteOrder::Native)?;
    info!(
        path = %path.display(),
        nodes = graph.order(),
        edges = graph.edge_count(),
        "graph loaded"
    );
    Ok(graph)
}

/// Decodes a binary graph from `reader`.
pub fn read_binary(mut reader: impl Read, order: ByteOrder) -> GraphResult<CsrGraph> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    let mut cursor = Cursor { data: &data, pos: 0 };

    let list_len = cursor.u64("header", order)?;
    let span_len = cursor.u64("header", order)?;

    let list_len = usize::try_from(list_len).map_err(|_| GraphError::LengthOverflow {
        section: "neighbor",
        value: list_len,
    })?;
    let span_len = usize::try_from(span_len).map_err(|_| GraphError::LengthOverflow {
        section: "offsets",
        value: span_len,
    })?;

    let list_bytes = cursor.take("neighbor array", list_len, 4)?;
    let neighbors: Vec<Node> = list_bytes
        .chunks_exact(4)
        .map(|c| order.u32([c[0], c[1], c[2], c[3]]))
        .collect();

    let span_bytes = cursor.take("offsets array", span_len, 8)?;
    let offsets: Vec<u64> = span_bytes
        .chunks_exact(8)
        .map(|c| order.u64([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
        .collect();

    let extra = data.len() - cursor.pos;
    if extra != 0 {
        return Err(GraphError::TrailingBytes(extra));
    }

    CsrGraph::try_from_csr_parts(offsets, neighbors)
}

/// Encodes `graph` in the binary format.
pub fn write_binary(mut writer: impl Write, graph: &CsrGraph, order: ByteOrder) -> GraphResult<()> {
    let mut w = BufWriter::new(&mut writer);
    w.write_all(&order.u64_bytes(graph.edge_count() as u64))?;
    w.write_all(&order.u64_bytes(graph.offsets().len() as u64))?;
    for &n in graph.neighbor_list() {
        w.write_all(&order.u32_bytes(n))?;
    }
    for &o in graph.offsets() {
        w.write_all(&order.u64_bytes(o))?;
    }
    w.flush()?;
    Ok(())
}

/// Loads a text graph file.
pub fn load_text(path: impl AsRef<Path>) -> GraphResult<CsrGraph> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading text graph");
    let graph = parse_text(BufReader::new(File::open(path)?))?;
    info!(
        path = %path.display(),
        nodes = graph.order(),
        edges = graph.edge_count(),
        "graph loaded"
    );
    Ok(graph)
}

/// Parses the text format from `reader`.
pub fn parse_text(reader: impl BufRead) -> GraphResult<CsrGraph> {
    let mut offsets = Vec::new();
    let mut neighbors = Vec::new();
    let mut separated = false;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let text = line.trim();
        let lineno = idx + 1;

        if !separated {
            if text == TEXT_SEPARATOR {
                separated = true;
                continue;
            }
            offsets.push(one_based(text, lineno)?);
        } else {
            neighbors.push(one_based_node(text, lineno)?);
        }
    }

    if !separated {
        return Err(GraphError::MissingSeparator);
    }
    CsrGraph::try_from_csr_parts(offsets, neighbors)
}

/// Encodes `graph` in the text format.
pub fn write_text(mut writer: impl Write, graph: &CsrGraph) -> GraphResult<()> {
    let mut w = BufWriter::new(&mut writer);
    for &o in graph.offsets() {
        writeln!(w, "{}", o + 1)?;
    }
    writeln!(w, "{TEXT_SEPARATOR}")?;
    for &n in graph.neighbor_list() {
        writeln!(w, "{}", u64::from(n) + 1)?;
    }
    w.flush()?;
    Ok(())
}

fn one_based(text: &str, line: usize) -> GraphResult<u64> {
    let value: u64 = text.parse().map_err(|_| GraphError::InvalidNumber {
        line,
        text: text.to_string(),
    })?;
    value.checked_sub(1).ok_or(GraphError::ZeroValue { line })
}

fn one_based_node(text: &str, line: usize) -> GraphResult<Node> {
    Node::try_from(one_based(text, line)?).map_err(|_| GraphError::InvalidNumber {
        line,
        text: text.to_string(),
    })
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, section: &'static str, count: usize, width: usize) -> GraphResult<&'a [u8]> {
        let expected = count.checked_mul(width).ok_or(GraphError::LengthOverflow {
            section,
            value: count as u64,
        })?;
        let actual = self.data.len() - self.pos;
        if actual < expected {
            return Err(GraphError::Truncated {
                section,
                expected,
                actual,
            });
        }
        let out = &self.data[self.pos..self.pos + expected];
        self.pos += expected;
        Ok(out)
    }

    fn u64(&mut self, section: &'static str, order: ByteOrder) -> GraphResult<u64> {
        let b = self.take(section, 1, 8)?;
        Ok(order.u64([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
    }
}
