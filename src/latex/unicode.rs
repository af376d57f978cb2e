//! `\DeclareUnicodeCharacter` collection for non-ASCII source characters.

use std::collections::HashSet;
use std::io::{self, Write};

use bstr::ByteSlice;

/// Characters already seen while scanning one document.
///
/// Created fresh for every render so declarations never leak across
/// documents.
#[derive(Debug, Default)]
pub struct DeclaredUnicode {
    seen: HashSet<char>,
    declared: usize,
}

impl DeclaredUnicode {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of declarations written so far.
    pub fn declared(&self) -> usize {
        self.declared
    }

    /// Whether `c` has already been considered.
    pub fn contains(&self, c: char) -> bool {
        self.seen.contains(&c)
    }

    /// Scan `source` once and declare every distinct multi-byte character
    /// the `declare` strategy handles.
    ///
    /// ASCII and invalid bytes are skipped. The strategy is consulted at
    /// most once per distinct character.
    pub fn write_declarations<W, F>(
        &mut self,
        w: &mut W,
        source: &[u8],
        declare: F,
    ) -> io::Result<()>
    where
        W: Write + ?Sized,
        F: Fn(char) -> Option<String>,
    {
        for (start, end, c) in source.char_indices() {
            if end - start == 1 {
                continue;
            }
            if c == char::REPLACEMENT_CHARACTER && &source[start..end] != "\u{FFFD}".as_bytes() {
                continue;
            }
            if !self.seen.insert(c) {
                continue;
            }
            let Some(replacement) = declare(c) else {
                continue;
            };
            write_declaration(w, c, &replacement)?;
            self.declared += 1;
        }
        Ok(())
    }
}

fn write_declaration<W: Write + ?Sized>(w: &mut W, c: char, replacement: &str) -> io::Result<()> {
    writeln!(
        w,
        "\\DeclareUnicodeCharacter{{{:04X}}}{{{}}}",
        u32::from(c),
        replacement
    )
}

/// Built-in declaration strategy for common symbols that `inputenc` does not
/// know out of the box.
///
/// Letters with diacritics are left to `inputenc`/`fontenc`.
pub fn declare_common_symbol(c: char) -> Option<String> {
    let replacement = match c {
        '★' => "$\\bigstar$",
        '☆' => "$\\star$",
        '→' => "$\\rightarrow$",
        '←' => "$\\leftarrow$",
        '↔' => "$\\leftrightarrow$",
        '⇒' => "$\\Rightarrow$",
        '⇐' => "$\\Leftarrow$",
        '⇔' => "$\\Leftrightarrow$",
        '≤' => "$\\leq$",
        '≥' => "$\\geq$",
        '≠' => "$\\neq$",
        '≈' => "$\\approx$",
        '∞' => "$\\infty$",
        '∑' => "$\\sum$",
        '∏' => "$\\prod$",
        '√' => "$\\sqrt{}$",
        '∈' => "$\\in$",
        '∀' => "$\\forall$",
        '∃' => "$\\exists$",
        '∂' => "$\\partial$",
        '∇' => "$\\nabla$",
        '±' => "$\\pm$",
        '×' => "$\\times$",
        '÷' => "$\\div$",
        'α' => "$\\alpha$",
        'β' => "$\\beta$",
        'γ' => "$\\gamma$",
        'δ' => "$\\delta$",
        'ε' => "$\\epsilon$",
        'θ' => "$\\theta$",
        'λ' => "$\\lambda$",
        'μ' => "$\\mu$",
        'π' => "$\\pi$",
        'σ' => "$\\sigma$",
        'φ' => "$\\phi$",
        'ω' => "$\\omega$",
        'Δ' => "$\\Delta$",
        'Σ' => "$\\Sigma$",
        'Ω' => "$\\Omega$",
        '✓' => "$\\checkmark$",
        '•' => "\\textbullet{}",
        '…' => "\\ldots{}",
        '€' => "\\texteuro{}",
        _ => return None,
    };
    Some(replacement.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stars(c: char) -> Option<String> {
        match c {
            '★' => Some("$\\filledstar$".to_string()),
            '☆' => Some("$\\smallstar$".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_each_character_declared_once() {
        let mut set = DeclaredUnicode::new();
        let mut out = Vec::new();
        set.write_declarations(&mut out, "a★b☆a★☆".as_bytes(), stars)
            .unwrap();
        let out = String::from_utf8(out).unwrap();

        assert_eq!(set.declared(), 2);
        assert_eq!(
            out,
            "\\DeclareUnicodeCharacter{2605}{$\\filledstar$}\n\
             \\DeclareUnicodeCharacter{2606}{$\\smallstar$}\n"
        );
    }

    #[test]
    fn test_unhandled_characters_are_skipped() {
        let mut set = DeclaredUnicode::new();
        let mut out = Vec::new();
        set.write_declarations(&mut out, "é ★".as_bytes(), stars).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert_eq!(set.declared(), 1);
        assert!(!out.contains("00E9"));
        assert!(set.contains('é'));
    }

    #[test]
    fn test_two_byte_character_padded() {
        let mut set = DeclaredUnicode::new();
        let mut out = Vec::new();
        set.write_declarations(&mut out, "é".as_bytes(), |_| Some("\\'e".to_string()))
            .unwrap();
        assert_eq!(out, b"\\DeclareUnicodeCharacter{00E9}{\\'e}\n");
    }

    #[test]
    fn test_common_symbols() {
        assert_eq!(declare_common_symbol('→').as_deref(), Some("$\\rightarrow$"));
        assert_eq!(declare_common_symbol('α').as_deref(), Some("$\\alpha$"));
        assert_eq!(declare_common_symbol('é'), None);
        assert_eq!(declare_common_symbol('a'), None);
    }

    #[test]
    fn test_ascii_and_invalid_bytes_ignored() {
        let mut set = DeclaredUnicode::new();
        let mut out = Vec::new();
        set.write_declarations(&mut out, b"plain \xff text", |_| Some("x".to_string()))
            .unwrap();
        assert!(out.is_empty());
    }
}
