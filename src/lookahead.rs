use std::collections::VecDeque;
use std::io::{self, BufRead};

use bstr::decode_utf8;

/// The character substituted for invalid or truncated UTF-8.
const REPLACEMENT: char = '\u{FFFD}';

/// A character source with bounded lookahead.
///
/// Bytes are pulled from an internal `BufReader` and decoded as UTF-8 one
/// character at a time. Characters obtained with `peek` are kept in a small
/// queue and handed out again, in order, by `next`.
#[derive(Debug)]
pub struct Lookahead<R> {
    rdr: io::BufReader<R>,
    pending: VecDeque<char>,
    /// One more than the number of `\n` consumed so far.
    line: u64,
}

impl<R: io::Read> Lookahead<R> {
    pub fn with_capacity(capacity: usize, rdr: R) -> Lookahead<R> {
        Lookahead {
            rdr: io::BufReader::with_capacity(capacity, rdr),
            pending: VecDeque::with_capacity(8),
            line: 1,
        }
    }

    /// Consume and return the next character, or `None` at end of input.
    pub fn next(&mut self) -> io::Result<Option<char>> {
        let c = match self.pending.pop_front() {
            Some(c) => c,
            None => match self.decode()? {
                Some(c) => c,
                None => return Ok(None),
            },
        };
        self.line += (c == '\n') as u64;
        Ok(Some(c))
    }

    /// Return up to `n` upcoming characters without consuming them.
    ///
    /// Fewer than `n` characters are returned only when the input ends
    /// first. Reaching the end of input is not an error.
    pub fn peek(&mut self, n: usize) -> io::Result<&[char]> {
        while self.pending.len() < n {
            match self.decode()? {
                Some(c) => self.pending.push_back(c),
                None => break,
            }
        }
        let end = n.min(self.pending.len());
        Ok(&self.pending.make_contiguous()[..end])
    }

    /// Consume `n` previously peeked characters.
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.pending.len());
        for c in self.pending.drain(..n) {
            self.line += (c == '\n') as u64;
        }
    }

    /// Consume a leading byte order mark, if one is next.
    ///
    /// Returns true if a BOM was found.
    pub fn strip_bom(&mut self) -> io::Result<bool> {
        if self.peek(1)? == ['\u{FEFF}'] {
            self.consume(1);
            return Ok(true);
        }
        Ok(false)
    }

    /// The current 1-based line number.
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn get_ref(&self) -> &R {
        self.rdr.get_ref()
    }

    pub fn get_mut(&mut self) -> &mut R {
        self.rdr.get_mut()
    }

    /// Unwraps this source. Any buffered data is lost.
    pub fn into_inner(self) -> R {
        self.rdr.into_inner()
    }

    fn decode(&mut self) -> io::Result<Option<char>> {
        let buf = self.rdr.fill_buf()?;
        if buf.is_empty() {
            return Ok(None);
        }
        let (ch, size) = decode_utf8(buf);
        // An incomplete sequence that runs to the end of the buffer may
        // just be split across two refills.
        if ch.is_some() || size < buf.len() {
            self.rdr.consume(size);
            return Ok(Some(ch.unwrap_or(REPLACEMENT)));
        }
        self.decode_split()
    }

    /// Decode a character whose bytes may straddle buffer refills.
    ///
    /// Bytes are only consumed once they are known to belong to the
    /// character being decoded.
    fn decode_split(&mut self) -> io::Result<Option<char>> {
        let mut scratch = [0u8; 4];
        let mut len = 0;
        loop {
            let b = match self.rdr.fill_buf()?.first() {
                Some(&b) => b,
                None => return Ok(Some(REPLACEMENT)),
            };
            scratch[len] = b;
            match decode_utf8(&scratch[..len + 1]) {
                (Some(ch), _) => {
                    self.rdr.consume(1);
                    return Ok(Some(ch));
                }
                // `b` cannot continue this sequence, so it starts the next
                // character.
                (None, valid) if valid <= len => return Ok(Some(REPLACEMENT)),
                (None, _) => {
                    self.rdr.consume(1);
                    len += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::Lookahead;

    /// A reader that hands out one byte per call to `read`.
    struct Trickle<'a>(&'a [u8]);

    impl<'a> io::Read for Trickle<'a> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.0[0];
            self.0 = &self.0[1..];
            Ok(1)
        }
    }

    fn chars<R: io::Read>(mut src: Lookahead<R>) -> String {
        let mut out = String::new();
        while let Some(c) = src.next().unwrap() {
            out.push(c);
        }
        out
    }

    #[test]
    fn next_and_peek() {
        let mut src = Lookahead::with_capacity(8, &b"abcd"[..]);
        assert_eq!(Some('a'), src.next().unwrap());
        assert_eq!(&['b', 'c'], src.peek(2).unwrap());
        assert_eq!(&['b', 'c', 'd'], src.peek(5).unwrap());
        assert_eq!(Some('b'), src.next().unwrap());
        src.consume(1);
        assert_eq!(Some('d'), src.next().unwrap());
        assert_eq!(None, src.next().unwrap());
        assert!(src.peek(3).unwrap().is_empty());
    }

    #[test]
    fn multi_byte() {
        let src = Lookahead::with_capacity(8, "あ,日本語".as_bytes());
        assert_eq!("あ,日本語", chars(src));
    }

    #[test]
    fn multi_byte_split_across_reads() {
        let data = "a한글😀b";
        let src = Lookahead::with_capacity(8, Trickle(data.as_bytes()));
        assert_eq!(data, chars(src));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let src = Lookahead::with_capacity(8, &b"a\xFFb"[..]);
        assert_eq!("a\u{FFFD}b", chars(src));

        let src = Lookahead::with_capacity(8, Trickle(b"a\xE3b"));
        assert_eq!("a\u{FFFD}b", chars(src));

        let src = Lookahead::with_capacity(8, Trickle(b"a\xE3\x81"));
        assert_eq!("a\u{FFFD}", chars(src));
    }

    #[test]
    fn strip_bom() {
        let mut src = Lookahead::with_capacity(8, &b"\xEF\xBB\xBFa"[..]);
        assert!(src.strip_bom().unwrap());
        assert_eq!("a", chars(src));

        let mut src = Lookahead::with_capacity(8, &b"a\xEF\xBB\xBF"[..]);
        assert!(!src.strip_bom().unwrap());
        assert_eq!("a\u{FEFF}", chars(src));

        let mut src = Lookahead::with_capacity(8, &b""[..]);
        assert!(!src.strip_bom().unwrap());
    }

    #[test]
    fn line_counts_consumed_newlines() {
        let mut src = Lookahead::with_capacity(8, &b"a\n\nb"[..]);
        assert_eq!(1, src.line());
        src.next().unwrap();
        src.peek(2).unwrap();
        assert_eq!(1, src.line());
        src.consume(2);
        assert_eq!(3, src.line());
    }
}
