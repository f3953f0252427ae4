//! Newline-delimited record counting
//!
//! A record is a run of bytes terminated by `\n`. A trailing run without a
//! final newline is an unterminated record: it is shown as a line, but the
//! cache does not count it when asking the remote side to skip lines, so the
//! remote resends that record whole once it is complete.

use std::io::Read;

/// Count the records in `content`, including an unterminated last one.
pub fn count_lines(content: &[u8]) -> usize {
    let mut counter = LineCounter::default();
    counter.feed(content);
    counter.records()
}

/// Count the `\n`-terminated records from a reader without holding the whole
/// stream in memory.
pub fn count_terminated_lines_from(mut reader: impl Read) -> std::io::Result<usize> {
    let mut counter = LineCounter::default();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let read = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        counter.feed(&buf[..read]);
    }
    Ok(counter.terminated())
}

/// Bytes after the last `\n` of `content`.
pub fn unterminated_tail(content: &[u8]) -> &[u8] {
    match content.iter().rposition(|b| *b == b'\n') {
        Some(idx) => &content[idx + 1..],
        None => content,
    }
}

#[derive(Debug, Default)]
struct LineCounter {
    newlines: usize,
    last: Option<u8>,
}

impl LineCounter {
    fn feed(&mut self, chunk: &[u8]) {
        self.newlines += chunk.iter().filter(|b| **b == b'\n').count();
        if let Some(last) = chunk.last() {
            self.last = Some(*last);
        }
    }

    fn terminated(&self) -> usize {
        self.newlines
    }

    fn records(&self) -> usize {
        match self.last {
            Some(b'\n') | None => self.newlines,
            Some(_) => self.newlines + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", 0)]
    #[case("\n", 1)]
    #[case("a\n", 1)]
    #[case("a\nb\n", 2)]
    #[case("a\nb", 2)]
    #[case("\n\n\n", 3)]
    #[case("no newline", 1)]
    fn counts_records(#[case] content: &str, #[case] expected: usize) {
        assert_eq!(count_lines(content.as_bytes()), expected);
    }

    #[rstest]
    #[case("", 0)]
    #[case("a\nb\n", 2)]
    #[case("a\nb", 1)]
    #[case("no newline", 0)]
    fn counts_terminated_records(#[case] content: &str, #[case] expected: usize) {
        assert_eq!(count_terminated_lines_from(content.as_bytes()).unwrap(), expected);
    }

    #[rstest]
    #[case("", "")]
    #[case("a\nb\n", "")]
    #[case("a\nb", "b")]
    #[case("partial", "partial")]
    fn finds_unterminated_tail(#[case] content: &str, #[case] expected: &str) {
        assert_eq!(unterminated_tail(content.as_bytes()), expected.as_bytes());
    }

    #[test]
    fn reader_count_matches_slice_count_across_chunks() {
        let content: Vec<u8> = (0..200_000u32)
            .flat_map(|i| format!("line {i}\n").into_bytes())
            .collect();
        let from_reader = count_terminated_lines_from(content.as_slice()).unwrap();
        assert_eq!(from_reader, 200_000);
        assert_eq!(from_reader, count_lines(&content));
    }
}
