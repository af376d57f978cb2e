//! Heading level policy: offset, clamping and sectioning command selection.

/// Highest effective level. Deeper headings fall back to bold text.
pub const MAX_HEADING_LEVEL: usize = 5;

/// Opening commands indexed by `[effective level][numbering disabled]`.
const HEADING_TABLE: [[&str; 2]; MAX_HEADING_LEVEL + 1] = [
    ["\\section{", "\\section*{"],
    ["\\subsection{", "\\subsection*{"],
    ["\\subsubsection{", "\\subsubsection*{"],
    ["\\paragraph{", "\\paragraph*{"],
    ["\\subparagraph{", "\\subparagraph*{"],
    ["\\textbf{", "\\textbf{"],
];

/// Effective level of a heading: `clamp(offset + level - 1, 0, 5)`.
///
/// A level 1 heading without offset maps to 0 (`\section`).
///
/// # Examples
///
/// ```
/// use mdlatex::latex::effective_heading_level;
///
/// assert_eq!(effective_heading_level(1, 0), 0);
/// assert_eq!(effective_heading_level(2, 1), 2);
/// assert_eq!(effective_heading_level(1, -3), 0);
/// assert_eq!(effective_heading_level(6, 4), 5);
/// ```
pub fn effective_heading_level(level: u8, offset: i32) -> usize {
    let raw = i64::from(offset) + i64::from(level) - 1;
    raw.clamp(0, MAX_HEADING_LEVEL as i64) as usize
}

/// Opening command for an effective level.
///
/// Levels past [`MAX_HEADING_LEVEL`] use the bold fallback.
pub fn heading_start(effective_level: usize, numbered: bool) -> &'static str {
    let row = &HEADING_TABLE[effective_level.min(MAX_HEADING_LEVEL)];
    row[usize::from(!numbered)]
}

/// Whether the level has no sectioning command and renders as bold text.
pub fn is_fallback_level(effective_level: usize) -> bool {
    effective_level >= MAX_HEADING_LEVEL
}
