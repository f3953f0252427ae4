//! Local stand-in for the remote `sed '1,Nd'` step.

/// Return the part of `content` after its first `n` records, the way
/// `sed '1,Nd'` does: an unterminated last record counts as a record.
pub fn skip_lines(content: &[u8], n: usize) -> &[u8] {
    if n == 0 {
        return content;
    }
    let mut seen = 0;
    for (idx, byte) in content.iter().enumerate() {
        if *byte == b'\n' {
            seen += 1;
            if seen == n {
                return &content[idx + 1..];
            }
        }
    }
    &[]
}
