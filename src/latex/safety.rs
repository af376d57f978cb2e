//! Filtering of content that could break out of the generated document.

use std::io::{self, Write};

use memchr::memmem;

use super::escape::has_prefix_ignore_case;

/// Command prefix that can close an environment or the whole document.
const TERMINATOR: &[u8] = b"\\end";

/// Comment emitted in place of a neutralised verbatim line.
const UNSAFE_LINE_WARNING: &[u8] =
    b"% mdlatex: Skipped following line due to possibly unsafe content:\n%";

/// Whether `line` contains the `\end` command prefix.
pub fn contains_terminator(line: &[u8]) -> bool {
    memmem::find(line, TERMINATOR).is_some()
}

/// Write one verbatim line, commenting it out when it could terminate the
/// enclosing environment and `allow_unsafe` is false.
///
/// Returns whether the line was neutralised.
pub fn write_guarded_line<W: Write + ?Sized>(
    w: &mut W,
    line: &[u8],
    allow_unsafe: bool,
) -> io::Result<bool> {
    if allow_unsafe || !contains_terminator(line) {
        w.write_all(line)?;
        return Ok(false);
    }
    w.write_all(UNSAFE_LINE_WARNING)?;
    w.write_all(line)?;
    if !line.ends_with(b"\n") {
        w.write_all(b"\n")?;
    }
    Ok(true)
}

/// Whether a link destination uses a scheme that should not be emitted in
/// safe mode.
///
/// `data:` URLs are allowed only for common raster image types.
pub fn is_dangerous_url(url: &[u8]) -> bool {
    const DATA_IMAGE: &[u8] = b"data:image/";
    const SAFE_IMAGE_TYPES: [&[u8]; 4] = [b"png;", b"gif;", b"jpeg;", b"webp;"];
    const DANGEROUS_SCHEMES: [&[u8]; 4] = [b"javascript:", b"vbscript:", b"file:", b"data:"];

    if has_prefix_ignore_case(url, DATA_IMAGE) {
        let rest = &url[DATA_IMAGE.len()..];
        return !SAFE_IMAGE_TYPES
            .iter()
            .any(|t| has_prefix_ignore_case(rest, t));
    }
    DANGEROUS_SCHEMES
        .iter()
        .any(|scheme| has_prefix_ignore_case(url, scheme))
}
