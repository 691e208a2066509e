//! Forward character cursor over a byte stream with pushback.

use std::collections::VecDeque;
use std::io::{BufRead, ErrorKind};

use crate::error::{Result, TurtleError};

/// Positions kept for [`CharCursor::unread`]
const HISTORY: usize = 8;

/// Decodes UTF-8 from `R` one character at a time.
///
/// Lines and columns are 1-based and count characters, not bytes.
pub(crate) struct CharCursor<R> {
    reader: R,
    lookahead: Vec<char>,
    line: usize,
    column: usize,
    history: VecDeque<(usize, usize)>,
}

impl<R: BufRead> CharCursor<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader,
            lookahead: Vec::with_capacity(4),
            line: 1,
            column: 1,
            history: VecDeque::with_capacity(HISTORY),
        }
    }

    /// Position of the next character to be read
    pub(crate) fn position(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    pub(crate) fn peek(&mut self) -> Result<Option<char>> {
        if let Some(&c) = self.lookahead.last() {
            return Ok(Some(c));
        }
        let next = self.decode()?;
        if let Some(c) = next {
            self.lookahead.push(c);
        }
        Ok(next)
    }

    pub(crate) fn next_char(&mut self) -> Result<Option<char>> {
        let next = match self.lookahead.pop() {
            Some(c) => Some(c),
            None => self.decode()?,
        };
        if let Some(c) = next {
            self.advance(c);
        }
        Ok(next)
    }

    /// Push `c` back; it becomes the next character read.
    pub(crate) fn unread(&mut self, c: char) {
        self.lookahead.push(c);
        if let Some((line, column)) = self.history.pop_back() {
            self.line = line;
            self.column = column;
        }
    }

    fn advance(&mut self, c: char) {
        if self.history.len() == HISTORY {
            self.history.pop_front();
        }
        self.history.push_back((self.line, self.column));
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    fn decode(&mut self) -> Result<Option<char>> {
        let Some(first) = self.read_byte()? else {
            return Ok(None);
        };
        let width = match first {
            0x00..=0x7F => return Ok(Some(first as char)),
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => return Err(self.invalid_utf8()),
        };
        let mut bytes = [first, 0, 0, 0];
        for slot in bytes.iter_mut().take(width).skip(1) {
            *slot = self.read_byte()?.ok_or_else(|| self.invalid_utf8())?;
        }
        std::str::from_utf8(&bytes[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .map(Some)
            .ok_or_else(|| self.invalid_utf8())
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        loop {
            let byte = match self.reader.fill_buf() {
                Ok(buf) => buf.first().copied(),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(TurtleError::Io(e)),
            };
            if byte.is_some() {
                self.reader.consume(1);
            }
            return Ok(byte);
        }
    }

    fn invalid_utf8(&self) -> TurtleError {
        TurtleError::parse(self.line, self.column, "invalid UTF-8 sequence")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_and_position() {
        let mut cursor = CharCursor::new("aé\nz".as_bytes());
        assert_eq!(cursor.next_char().unwrap(), Some('a'));
        assert_eq!(cursor.peek().unwrap(), Some('é'));
        assert_eq!(cursor.position(), (1, 2));
        assert_eq!(cursor.next_char().unwrap(), Some('é'));
        assert_eq!(cursor.next_char().unwrap(), Some('\n'));
        assert_eq!(cursor.position(), (2, 1));
        assert_eq!(cursor.next_char().unwrap(), Some('z'));
        assert_eq!(cursor.next_char().unwrap(), None);
    }

    #[test]
    fn test_unread_restores_position() {
        let mut cursor = CharCursor::new("ab\nc".as_bytes());
        cursor.next_char().unwrap();
        cursor.next_char().unwrap();
        let nl = cursor.next_char().unwrap().unwrap();
        assert_eq!(cursor.position(), (2, 1));
        cursor.unread(nl);
        assert_eq!(cursor.position(), (1, 3));
        assert_eq!(cursor.next_char().unwrap(), Some('\n'));
    }

    #[test]
    fn test_invalid_utf8() {
        let bytes: &[u8] = &[b'a', 0xFF];
        let mut cursor = CharCursor::new(bytes);
        cursor.next_char().unwrap();
        assert!(matches!(cursor.next_char(), Err(TurtleError::Parse { .. })));
    }
}
