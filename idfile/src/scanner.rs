//! Line scanning over an identity file stream.
//!
//! [`Lines`] is a single forward pass over a reader. Lines are split on `\n`
//! and have surrounding whitespace removed, so `\r\n` files scan the same as
//! `\n` files. Whitespace is Unicode whitespace for UTF-8 lines, and ASCII
//! whitespace plus vertical tab otherwise. The scanner cannot be rewound; the decoder owns it for
//! the duration of one decode.

use std::io::{self, BufRead, BufReader, Read};

use crate::error::{Error, Result};

pub const PEM_BEGIN: &[u8] = b"-----BEGIN";
pub const PEM_END: &[u8] = b"-----END";

/// Iterator of trimmed lines.
///
/// Yields `Some(Err(_))` once on a read fault and `None` afterwards, so end
/// of stream and a failed read are always distinguishable.
#[derive(Debug)]
pub struct Lines<R> {
    reader: R,
    buf: Vec<u8>,
    finished: bool,
}

impl<R: BufRead> Lines<R> {
    pub fn new(reader: R) -> Self {
        Lines {
            reader,
            buf: Vec::new(),
            finished: false,
        }
    }

    /// Collects one PEM block starting at `first`, which must be its BEGIN line.
    ///
    /// Every line up to and including the first `-----END` line is copied into
    /// the block, each terminated by a single `\n`.
    pub fn collect_pem_block(&mut self, first: Vec<u8>) -> Result<Vec<u8>> {
        let mut block = Vec::new();
        let mut line = first;
        loop {
            block.extend_from_slice(&line);
            block.push(b'\n');
            if line.starts_with(PEM_END) {
                return Ok(block);
            }
            line = match self.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => return Err(Error::read_fault(e)),
                None => return Err(Error::malformed("invalid PEM block (fragment)")),
            };
        }
    }
}

impl<R: BufRead> Iterator for Lines<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.finished = true;
                None
            }
            Ok(_) => Some(Ok(trim_space(&self.buf).to_vec())),
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

fn trim_space(line: &[u8]) -> &[u8] {
    if let Ok(text) = std::str::from_utf8(line) {
        return text.trim().as_bytes();
    }
    let is_space = |b: &u8| b.is_ascii_whitespace() || *b == 0x0b;
    let start = line.iter().position(|b| !is_space(b)).unwrap_or(line.len());
    let end = line.iter().rposition(|b| !is_space(b)).map_or(start, |i| i + 1);
    &line[start..end]
}

/// Collects every PEM block of `reader`, skipping text between blocks.
///
/// Blocks come out exactly as the identity file decoder would store them:
/// lines trimmed and `\n` terminated, header lines and line wrapping kept.
pub fn read_pem_blocks<R: Read>(reader: R) -> Result<Vec<Vec<u8>>> {
    let mut lines = Lines::new(BufReader::new(reader));
    let mut blocks = Vec::new();
    while let Some(line) = lines.next() {
        let line = line.map_err(Error::read_fault)?;
        if line.starts_with(PEM_BEGIN) {
            blocks.push(lines.collect_pem_block(line)?);
        }
    }
    Ok(blocks)
}
