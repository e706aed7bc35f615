//! The line colorizer: exclusion-region pass, token spans, extras.
//!
//! Coloring never mutates text between passes. Token spans are
//! collected against the raw visible slice (first collector wins on
//! overlap), then rendered in one walk. Emitted SGR sequences are
//! therefore never re-scanned, which is what keeps digits inside
//! escape bodies uncolored.

use crate::languages::{LanguageMode, LanguageSyntax};
use crate::regions::{
    Region, RegionKind, find_exclusion_regions, inside_region, parse_number,
};
use cm_config::{RESET, SyntaxColorSet};

struct Span<'a> {
    start: usize,
    end: usize,
    color: &'a str,
}

fn overlaps(spans: &[Span<'_>], start: usize, end: usize) -> bool {
    spans.iter().any(|s| s.start < end && start < s.end)
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Wrap the whole slice in one color (whole-line comment/include path).
fn wrap(visible: &str, color: &str) -> String {
    if color.is_empty() || visible.is_empty() {
        return visible.to_string();
    }
    format!("{color}{visible}{RESET}")
}

fn render(visible: &str, mut spans: Vec<Span<'_>>) -> String {
    spans.retain(|s| !s.color.is_empty() && s.start < s.end);
    if spans.is_empty() {
        return visible.to_string();
    }
    spans.sort_by_key(|s| s.start);
    let mut out = String::with_capacity(visible.len() * 2);
    let mut pos = 0usize;
    for span in spans {
        if span.start < pos {
            continue;
        }
        out.push_str(&visible[pos..span.start]);
        out.push_str(span.color);
        out.push_str(&visible[span.start..span.end]);
        out.push_str(RESET);
        pos = span.end;
    }
    out.push_str(&visible[pos..]);
    out
}

/// Collect whole-word matches for every name in a comma-separated
/// list, skipping exclusion regions and anything already claimed.
fn collect_words<'a>(
    spans: &mut Vec<Span<'a>>,
    visible: &str,
    csv: &str,
    color: &'a str,
    regions: &[Region],
) {
    if csv.is_empty() || color.is_empty() {
        return;
    }
    let bytes = visible.as_bytes();
    for word in csv.split(',') {
        if word.is_empty() {
            continue;
        }
        let mut from = 0usize;
        while let Some(found) = visible[from..].find(word) {
            let start = from + found;
            let end = start + word.len();
            from = end;
            let left_ok = start == 0 || !is_ident(bytes[start - 1]);
            let right_ok = end == bytes.len() || !is_ident(bytes[end]);
            if left_ok
                && right_ok
                && !inside_region(start, regions)
                && !overlaps(spans, start, end)
            {
                spans.push(Span { start, end, color });
            }
        }
    }
}

fn collect_numbers<'a>(
    spans: &mut Vec<Span<'a>>,
    visible: &str,
    color: &'a str,
    regions: &[Region],
) {
    if color.is_empty() {
        return;
    }
    let bytes = visible.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        if inside_region(i, regions) {
            i += 1;
            continue;
        }
        match parse_number(bytes, i) {
            Some(end) => {
                if !overlaps(spans, i, end) {
                    spans.push(Span {
                        start: i,
                        end,
                        color,
                    });
                }
                i = end;
            }
            None => i += 1,
        }
    }
}

/// `Qualifier::Member` method-definition highlight (C and C++ only).
fn collect_method_defs<'a>(
    spans: &mut Vec<Span<'a>>,
    visible: &str,
    color: &'a str,
    regions: &[Region],
) {
    if color.is_empty() {
        return;
    }
    let bytes = visible.as_bytes();
    let mut from = 0usize;
    while let Some(found) = visible[from..].find("::") {
        let sep = from + found;
        from = sep + 2;
        if inside_region(sep, regions) {
            continue;
        }
        let mut start = sep;
        while start > 0 && is_ident(bytes[start - 1]) {
            start -= 1;
        }
        let mut end = sep + 2;
        while end < bytes.len() && is_ident(bytes[end]) {
            end += 1;
        }
        if start < sep && end > sep + 2 && !overlaps(spans, start, end) {
            spans.push(Span { start, end, color });
        }
    }
}

fn collect_literal_regions<'a>(
    spans: &mut Vec<Span<'a>>,
    regions: &[Region],
    string_color: &'a str,
    comment_color: &'a str,
) {
    for region in regions {
        let color = match region.kind {
            RegionKind::Literal => string_color,
            RegionKind::Comment => comment_color,
        };
        spans.push(Span {
            start: region.start,
            end: region.end,
            color,
        });
    }
}

//-------------------------------------------------------------------
// Language extras
//-------------------------------------------------------------------

/// Markdown: `#` headers color the whole line; otherwise `code` spans
/// and `**bold**` / `__bold__` runs.
fn colorize_markdown(visible: &str, colors: &SyntaxColorSet) -> String {
    if visible.starts_with('#') {
        return wrap(visible, &colors.keyword);
    }
    let bytes = visible.as_bytes();
    let mut spans: Vec<Span<'_>> = Vec::new();

    if !colors.string.is_empty() {
        let mut i = 0usize;
        while i < bytes.len() {
            if bytes[i] == b'`' {
                if let Some(close) = visible[i + 1..].find('`') {
                    let end = i + 1 + close + 1;
                    spans.push(Span {
                        start: i,
                        end,
                        color: &colors.string,
                    });
                    i = end;
                    continue;
                }
            }
            i += 1;
        }
    }

    if !colors.r#type.is_empty() {
        for marker in ["**", "__"] {
            let mut from = 0usize;
            while let Some(open) = visible[from..].find(marker) {
                let start = from + open;
                let Some(close) = visible[start + 2..].find(marker) else {
                    break;
                };
                let end = start + 2 + close + 2;
                if !overlaps(&spans, start, end) {
                    spans.push(Span {
                        start,
                        end,
                        color: &colors.r#type,
                    });
                }
                from = end;
            }
        }
    }
    render(visible, spans)
}

/// Makefile: color an early `target:` prefix and `$(VAR)` / `${VAR}` /
/// `$@`-style automatic variables.
fn collect_makefile<'a>(
    spans: &mut Vec<Span<'a>>,
    visible: &str,
    colors: &'a SyntaxColorSet,
    regions: &[Region],
) {
    let bytes = visible.as_bytes();

    if !colors.method_definition.is_empty()
        && let Some(colon) = visible.find(':')
        && colon > 0
        && colon < 40
    {
        let after = bytes.get(colon + 1).copied();
        let plain_target = after != Some(b'=')
            && after != Some(b':')
            && !visible[..colon]
                .bytes()
                .any(|b| matches!(b, b'$' | b'(' | b')' | b'='))
            && !inside_region(colon, regions);
        if plain_target && !overlaps(spans, 0, colon) {
            spans.push(Span {
                start: 0,
                end: colon,
                color: &colors.method_definition,
            });
        }
    }

    if colors.constant.is_empty() {
        return;
    }
    let mut i = 0usize;
    while i + 1 < bytes.len() {
        if bytes[i] == b'$' {
            let end = match bytes[i + 1] {
                b'(' => visible[i + 2..].find(')').map(|c| i + 2 + c + 1),
                b'{' => visible[i + 2..].find('}').map(|c| i + 2 + c + 1),
                b'@' | b'<' | b'^' | b'?' | b'*' | b'+' => Some(i + 2),
                _ => None,
            };
            if let Some(end) = end {
                if !overlaps(spans, i, end) {
                    spans.push(Span {
                        start: i,
                        end,
                        color: &colors.constant,
                    });
                }
                i = end;
                continue;
            }
        }
        i += 1;
    }
}

/// Python: a `@decorator` (possibly dotted) at the start of the line.
fn collect_python_decorator<'a>(
    spans: &mut Vec<Span<'a>>,
    visible: &str,
    color: &'a str,
) {
    if color.is_empty() {
        return;
    }
    let bytes = visible.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    if i >= bytes.len() || bytes[i] != b'@' {
        return;
    }
    let start = i;
    i += 1;
    while i < bytes.len() && !matches!(bytes[i], b'(' | b' ' | b'\t') {
        i += 1;
    }
    if !overlaps(spans, start, i) {
        spans.push(Span {
            start,
            end: i,
            color,
        });
    }
}

//-------------------------------------------------------------------
// Main pipeline
//-------------------------------------------------------------------

/// Colorize the visible slice of a line. `full_line` supplies context
/// the slice may have scrolled past (a comment opening before the
/// visible window still colors the visible tail).
pub fn colorize_line(
    syntax: Option<&LanguageSyntax>,
    colors: &SyntaxColorSet,
    full_line: &str,
    visible: &str,
) -> String {
    let Some(syntax) = syntax else {
        return visible.to_string();
    };
    let mode = syntax.mode;
    let first_token = full_line.split_whitespace().next().unwrap_or("");

    // Whole-line classification against the full line.
    if let Some(marker) = syntax.line_comment
        && first_token.starts_with(marker)
    {
        return wrap(visible, &colors.comment);
    }
    if first_token.starts_with('#')
        && !matches!(
            mode,
            LanguageMode::Markdown
                | LanguageMode::Makefile
                | LanguageMode::Python
                | LanguageMode::Shell
        )
    {
        return wrap(visible, &colors.include);
    }

    if mode == LanguageMode::Markdown {
        return colorize_markdown(visible, colors);
    }

    let regions = find_exclusion_regions(visible, syntax.line_comment);
    let mut spans: Vec<Span<'_>> = Vec::new();

    // Collection order is the contract: numbers, then types, keywords,
    // constants. The first collector to claim a span wins overlaps.
    collect_numbers(&mut spans, visible, &colors.number, &regions);
    collect_words(&mut spans, visible, syntax.types, &colors.r#type, &regions);
    collect_words(&mut spans, visible, syntax.keywords, &colors.keyword, &regions);
    let constant_color = if colors.constant.is_empty() {
        &colors.keyword
    } else {
        &colors.constant
    };
    collect_words(&mut spans, visible, syntax.constants, constant_color, &regions);

    if matches!(mode, LanguageMode::C | LanguageMode::Cpp) {
        collect_method_defs(&mut spans, visible, &colors.method_definition, &regions);
    }
    if mode == LanguageMode::Makefile {
        collect_makefile(&mut spans, visible, colors, &regions);
    }
    if mode == LanguageMode::Python {
        collect_python_decorator(&mut spans, visible, &colors.keyword);
    }

    collect_literal_regions(&mut spans, &regions, &colors.string, &colors.comment);
    render(visible, spans)
}
