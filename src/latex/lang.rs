//! Fenced code language whitelist.
//!
//! Only languages known to the `listings` package get a `[language=...]`
//! option; anything else renders as plain verbatim text.

/// Longest language tag considered, in bytes.
pub const MAX_LANGUAGE_LEN: usize = 10;

/// Language names understood by `lstlisting`, sorted for binary search.
///
/// Taken from the driver files of the `listings` package, lower-cased.
const SUPPORTED_LANGUAGES: [&str; 88] = [
    "abap", "acm", "acmscript", "acsl", "ada", "algol", "ant", "assembler", "awk", "bash",
    "basic", "c", "caml", "cil", "clean", "cobol", "comsol", "csh", "delphi", "eiffel", "elan",
    "elisp", "erlang", "euphoria", "fortran", "gap", "gcl", "gnuplot", "go", "hansl",
    "haskell", "html", "idl", "inform", "java", "jvmis", "ksh", "lingo", "lisp", "llvm",
    "logo", "lua", "make", "matlab", "mercury", "metapost", "miranda", "mizar",
    "ml", "mupad", "nastran", "ocl", "octave", "oorexx", "oz", "pascal", "perl", "php",
    "plasm", "postscript", "pov", "prolog", "promela", "pstricks", "python", "r", "reduce",
    "rexx", "rsl", "ruby", "s", "sas", "scala", "scilab", "sh", "shelxl", "simula", "sparql",
    "sql", "swift", "tcl", "tex", "vbscript", "verilog", "vhdl", "vrml", "xml", "xslt",
];

/// Look up a fenced code language tag.
///
/// The tag is truncated to [`MAX_LANGUAGE_LEN`] bytes and then matched
/// case-sensitively. Returns the truncated tag when it is supported.
///
/// # Examples
///
/// ```
/// use mdlatex::latex::supported_language;
///
/// assert_eq!(supported_language(b"python"), Some(&b"python"[..]));
/// assert_eq!(supported_language(b"Python"), None);
/// assert_eq!(supported_language(b"rust"), None);
/// ```
pub fn supported_language(tag: &[u8]) -> Option<&[u8]> {
    let tag = &tag[..tag.len().min(MAX_LANGUAGE_LEN)];
    let name = std::str::from_utf8(tag).ok()?;
    SUPPORTED_LANGUAGES
        .binary_search(&name)
        .ok()
        .map(|_| tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted_and_short() {
        assert!(SUPPORTED_LANGUAGES.windows(2).all(|w| w[0] < w[1]));
        assert!(SUPPORTED_LANGUAGES.iter().all(|l| l.len() <= MAX_LANGUAGE_LEN));
    }

    #[test]
    fn test_every_entry_is_supported() {
        for lang in SUPPORTED_LANGUAGES {
            assert_eq!(supported_language(lang.as_bytes()), Some(lang.as_bytes()));
        }
    }

    #[test]
    fn test_unknown_or_empty_language() {
        assert_eq!(supported_language(b""), None);
        assert_eq!(supported_language(b"rust"), None);
        assert_eq!(supported_language(b"GO"), None);
    }

    #[test]
    fn test_one_byte_longer_is_rejected() {
        assert_eq!(supported_language(b"gox"), None);
        assert_eq!(supported_language(b"pythonx"), None);
    }

    #[test]
    fn test_truncation_to_ten_bytes() {
        // "postscript" is exactly ten bytes, extra bytes are cut before lookup.
        assert_eq!(supported_language(b"postscriptx"), Some(&b"postscript"[..]));
        assert_eq!(supported_language(b"mathematica"), None);
    }
}
