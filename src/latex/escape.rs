//! LaTeX escaping of reserved characters.
//!
//! The scanner is byte oriented. Every reserved character is seven-bit ASCII
//! and no UTF-8 continuation byte falls in that range, so multi-byte
//! sequences pass through untouched.

use std::io::{self, Write};

/// Replacement for a reserved byte, or `None` if the byte is emitted as is.
#[inline]
fn escape_sequence(b: u8) -> Option<&'static [u8]> {
    let seq: &'static [u8] = match b {
        b'\\' => b"\\textbackslash{}",
        b'~' => b"\\textasciitilde{}",
        b'^' => b"\\textasciicircum{}",
        b'&' => b"\\&",
        b'%' => b"\\%",
        b'$' => b"\\$",
        b'#' => b"\\#",
        b'_' => b"\\_",
        b'{' => b"\\{",
        b'}' => b"\\}",
        _ => return None,
    };
    Some(seq)
}

/// Write `text` to `w`, replacing the ten LaTeX reserved characters.
///
/// Unescaped runs are flushed in one write each.
pub fn write_escaped<W: Write + ?Sized>(w: &mut W, text: &[u8]) -> io::Result<()> {
    let mut start = 0;
    for (end, &b) in text.iter().enumerate() {
        if let Some(seq) = escape_sequence(b) {
            w.write_all(&text[start..end])?;
            w.write_all(seq)?;
            start = end + 1;
        }
    }
    if start < text.len() {
        w.write_all(&text[start..])?;
    }
    Ok(())
}

/// Escape `text` into a new buffer.
///
/// # Examples
///
/// ```
/// use mdlatex::latex::escape_latex;
///
/// assert_eq!(escape_latex(b"50% off"), b"50\\% off");
/// assert_eq!(escape_latex(b"a_b"), b"a\\_b");
/// ```
pub fn escape_latex(text: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + text.len() / 8);
    // Writing into a Vec cannot fail.
    let _ = write_escaped(&mut out, text);
    out
}

/// ASCII case-insensitive `starts_with`.
pub(crate) fn has_prefix_ignore_case(s: &[u8], prefix: &[u8]) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
