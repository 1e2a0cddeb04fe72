use std::io::{BufRead, Read};

use log::trace;

use crate::{Result, SdpError};

/// Line-at-a-time reader over an SDP byte stream.
///
/// Peeking looks at the first buffered byte only, so deciding whether a
/// repeated slot continues never copies the line.
#[derive(Debug)]
pub struct LineCursor<R> {
    reader: R,
    max_line_len: usize,
    line_no: usize,
}

impl<R: BufRead> LineCursor<R> {
    pub fn new(reader: R, max_line_len: usize) -> Self {
        Self {
            reader,
            max_line_len,
            line_no: 0,
        }
    }

    /// Number of lines consumed so far.
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    /// True when the next line starts with `tag`. End of input is `false`.
    pub fn peek_prefix(&mut self, tag: u8) -> Result<bool> {
        Ok(self.reader.fill_buf()?.first() == Some(&tag))
    }

    /// Reads the next line, which must be `<tag>=...`, and returns the text
    /// after the `=` with the line terminator stripped.
    pub fn consume_line(&mut self, tag: u8) -> Result<String> {
        let mut raw = Vec::new();
        let limit = (self.max_line_len as u64).saturating_add(2);
        let read = self
            .reader
            .by_ref()
            .take(limit)
            .read_until(b'\n', &mut raw)?;
        if read == 0 {
            return Err(SdpError::syntax(format!(
                "unexpected end of input, expected {}=",
                tag as char
            )));
        }
        self.line_no += 1;

        while matches!(raw.last(), Some(b'\n' | b'\r')) {
            raw.pop();
        }
        if raw.len() > self.max_line_len {
            return Err(SdpError::invalid(format!(
                "line {} longer than {} bytes",
                self.line_no, self.max_line_len
            )));
        }

        let line = String::from_utf8(raw)
            .map_err(|_| SdpError::syntax(format!("line {} is not valid UTF-8", self.line_no)))?;
        trace!("line {}: {line}", self.line_no);

        match line.as_bytes() {
            [first, b'=', ..] if *first == tag => Ok(line[2..].to_string()),
            _ => Err(SdpError::syntax(format!(
                "line {}: missing prefix {}=",
                self.line_no, tag as char
            ))),
        }
    }

    /// Skips blank lines and reports whether the input is exhausted.
    pub fn at_end(&mut self) -> Result<bool> {
        loop {
            let next = self.reader.fill_buf()?.first().copied();
            match next {
                None => return Ok(true),
                Some(b'\r' | b'\n') => self.reader.consume(1),
                Some(_) => return Ok(false),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(input: &str) -> LineCursor<&[u8]> {
        LineCursor::new(input.as_bytes(), 128)
    }

    #[test]
    fn peeks_without_consuming() {
        let mut c = cursor("v=0\r\no=x\r\n");
        assert!(c.peek_prefix(b'v').unwrap());
        assert!(!c.peek_prefix(b'o').unwrap());
        assert_eq!(c.consume_line(b'v').unwrap(), "0");
        assert!(c.peek_prefix(b'o').unwrap());
        assert_eq!(c.line_no(), 1);
    }

    #[test]
    fn accepts_bare_lf_and_missing_terminator() {
        let mut c = cursor("s=one\ni=two");
        assert_eq!(c.consume_line(b's').unwrap(), "one");
        assert_eq!(c.consume_line(b'i').unwrap(), "two");
        assert!(c.at_end().unwrap());
        assert!(!c.peek_prefix(b'i').unwrap());
    }

    #[test]
    fn rejects_wrong_prefix_and_eof() {
        let mut c = cursor("s=name\r\n");
        assert!(c.consume_line(b'v').unwrap_err().is_syntax());

        let mut empty = cursor("");
        assert!(empty.consume_line(b'v').unwrap_err().is_syntax());

        let mut no_eq = cursor("vx\r\n");
        assert!(no_eq.consume_line(b'v').unwrap_err().is_syntax());
    }

    #[test]
    fn enforces_line_limit() {
        let long = format!("a={}\r\n", "x".repeat(200));
        let mut c = cursor(&long);
        assert!(c.consume_line(b'a').unwrap_err().is_invalid());
    }

    #[test]
    fn unbounded_line_limit() {
        let mut c = LineCursor::new("v=0\r\ns=long line\r\n".as_bytes(), usize::MAX);
        assert_eq!(c.consume_line(b'v').unwrap(), "0");
        assert_eq!(c.consume_line(b's').unwrap(), "long line");
    }

    #[test]
    fn skips_trailing_blank_lines() {
        let mut c = cursor("\r\n\n\r\n");
        assert!(c.at_end().unwrap());
        let mut more = cursor("\r\nx=1");
        assert!(!more.at_end().unwrap());
    }
}
