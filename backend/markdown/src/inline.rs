//! Inline span matcher for bold, italic and inline code.
//!
//! A single left-to-right scan. At each position the matchers are tried in
//! precedence order (bold, italic, code); the first match wins and its
//! content is never re-scanned, so emphasis does not nest.

use crate::ir::InlineRun;

type SpanMatch = (InlineRun, usize);

/// Splits one line of text into inline runs.
///
/// Unmatched markers are kept as literal text and adjacent plain text is
/// merged into a single run.
pub fn parse_inline(text: &str) -> Vec<InlineRun> {
    let mut runs = Vec::new();
    let mut plain = String::new();
    let mut pos = 0;

    while let Some(ch) = text[pos..].chars().next() {
        if let Some((run, consumed)) = match_span(&text[pos..]) {
            if !plain.is_empty() {
                runs.push(InlineRun::PlainText(std::mem::take(&mut plain)));
            }
            runs.push(run);
            pos += consumed;
            continue;
        }
        plain.push(ch);
        pos += ch.len_utf8();
    }

    if !plain.is_empty() {
        runs.push(InlineRun::PlainText(plain));
    }
    runs
}

fn match_span(rest: &str) -> Option<SpanMatch> {
    match rest.as_bytes().first()? {
        b'*' => match_bold(rest).or_else(|| match_italic(rest)),
        b'`' => match_code(rest),
        _ => None,
    }
}

/// `**x**` with non-empty content.
fn match_bold(rest: &str) -> Option<SpanMatch> {
    let body = rest.strip_prefix("**")?;
    let first = body.chars().next()?.len_utf8();
    let close = first + body[first..].find("**")?;
    Some((InlineRun::Bold(body[..close].to_string()), close + 4))
}

/// `*x*` where the opener is not followed by whitespace (or another `*`) and
/// the closer is not preceded by whitespace.
fn match_italic(rest: &str) -> Option<SpanMatch> {
    let body = rest.strip_prefix('*')?;
    let mut chars = body.char_indices();
    let (_, first) = chars.next()?;
    if first.is_whitespace() || first == '*' {
        return None;
    }

    let mut prev = first;
    for (i, ch) in chars {
        if ch == '*' && !prev.is_whitespace() {
            return Some((InlineRun::Italic(body[..i].to_string()), i + 2));
        }
        prev = ch;
    }
    None
}

/// `` `x` `` with non-empty content.
fn match_code(rest: &str) -> Option<SpanMatch> {
    let body = rest.strip_prefix('`')?;
    match body.find('`')? {
        0 => None,
        close => Some((InlineRun::Code(body[..close].to_string()), close + 2)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain(text: &str) -> InlineRun {
        InlineRun::PlainText(text.to_string())
    }

    #[test]
    fn test_emphasis_precedence() {
        assert_eq!(
            parse_inline("**a** *b* `c`"),
            vec![
                InlineRun::Bold("a".into()),
                plain(" "),
                InlineRun::Italic("b".into()),
                plain(" "),
                InlineRun::Code("c".into()),
            ]
        );
    }

    #[test]
    fn test_unmatched_markers_stay_literal() {
        assert_eq!(parse_inline("a * b"), vec![plain("a * b")]);
        assert_eq!(parse_inline("*open"), vec![plain("*open")]);
        assert_eq!(parse_inline("**open"), vec![plain("**open")]);
        assert_eq!(parse_inline("tick ` only"), vec![plain("tick ` only")]);
        assert_eq!(parse_inline("``"), vec![plain("``")]);
    }

    #[test]
    fn test_whitespace_flanked_star_is_not_italic() {
        assert_eq!(parse_inline("2 * 3 * 4"), vec![plain("2 * 3 * 4")]);
        assert_eq!(parse_inline("*a *"), vec![plain("*a *")]);
    }

    #[test]
    fn test_triple_star_first_match_wins() {
        assert_eq!(
            parse_inline("***x***"),
            vec![InlineRun::Bold("*x".into()), plain("*")]
        );
    }

    #[test]
    fn test_code_content_not_rescanned() {
        assert_eq!(
            parse_inline("`*not italic*`"),
            vec![InlineRun::Code("*not italic*".into())]
        );
    }

    #[test]
    fn test_bold_contains_literal_star() {
        assert_eq!(parse_inline("**a*b**"), vec![InlineRun::Bold("a*b".into())]);
    }

    #[test]
    fn test_multibyte_text_around_spans() {
        assert_eq!(
            parse_inline("héllo **wörld** ✓"),
            vec![plain("héllo "), InlineRun::Bold("wörld".into()), plain(" ✓")]
        );
    }
}
