use winnow::ascii::multispace0;
use winnow::combinator::opt;
use winnow::error::{ContextError, ErrMode, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{literal, take_while};

/// Words that can never be used as identifiers.
pub const RESERVED: &[&str] = &[
    "true", "false", "null", "if", "then", "else", "and", "or", "not", "in",
];

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

pub fn ident<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    // First character must be alphabetic or underscore (not digit).
    if !input.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)
}

/// Like [`ident`] but rejects reserved words.
pub fn name<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    let saved = *input;
    let word = ident.parse_next(input)?;
    if RESERVED.contains(&word) {
        *input = saved;
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    Ok(word)
}

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

/// Double-quoted string. `\"`, `\\`, `\n` and `\t` are the only escapes.
pub fn quoted_string(input: &mut &str) -> ModalResult<String> {
    literal("\"").parse_next(input)?;
    let mut out = String::new();
    loop {
        let chunk = take_while(0.., |c: char| c != '"' && c != '\\').parse_next(input)?;
        out.push_str(chunk);
        if opt(literal("\\")).parse_next(input)?.is_some() {
            let escaped = input.chars().next().ok_or(ErrMode::Cut(ContextError::new()))?;
            let replacement = match escaped {
                'n' => '\n',
                't' => '\t',
                '"' | '\\' => escaped,
                _ => return Err(ErrMode::Cut(ContextError::new())),
            };
            let rest: &str = *input;
            *input = &rest[escaped.len_utf8()..];
            out.push(replacement);
            continue;
        }
        break;
    }
    winnow::combinator::cut_err(literal("\""))
        .context(StrContext::Expected(StrContextValue::Description(
            "closing quote",
        )))
        .parse_next(input)?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// Whitespace & comments
// ---------------------------------------------------------------------------

/// Skip whitespace and `# ...` line comments.
pub fn ws_skip(input: &mut &str) -> ModalResult<()> {
    loop {
        let _ = multispace0.parse_next(input)?;
        if opt(literal("#")).parse_next(input)?.is_some() {
            let _ = take_while(0.., |c: char| c != '\n').parse_next(input)?;
        } else {
            break;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Keyword matching with word boundary
// ---------------------------------------------------------------------------

/// Match an exact keyword string, ensuring it's not a prefix of a longer
/// identifier (i.e. the next character is not alphanumeric or `_`).
pub fn kw<'a>(keyword: &'static str) -> impl FnMut(&mut &'a str) -> ModalResult<()> {
    move |input: &mut &'a str| {
        let saved = *input;
        literal(keyword).parse_next(input)?;
        if input.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_') {
            *input = saved;
            return Err(ErrMode::Backtrack(ContextError::new()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Number literal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

/// Parse a number literal: integer or float.
pub fn number_literal(input: &mut &str) -> ModalResult<Number> {
    let integer_part = take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    let has_dot = opt(literal(".")).parse_next(input)?.is_some();
    if has_dot {
        let frac_part = take_while(1.., |c: char| c.is_ascii_digit())
            .context(StrContext::Expected(StrContextValue::Description(
                "digits after decimal point",
            )))
            .parse_next(input)?;
        let s = format!("{integer_part}.{frac_part}");
        let v: f64 = s.parse().map_err(|_| ErrMode::Cut(ContextError::new()))?;
        Ok(Number::Float(v))
    } else {
        let v: i64 = integer_part
            .parse()
            .map_err(|_| ErrMode::Cut(ContextError::new()))?;
        Ok(Number::Int(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_respects_word_boundary() {
        let mut input = "index";
        assert!(kw("in").parse_next(&mut input).is_err());
        assert_eq!(input, "index");

        let mut input = "in (1)";
        assert!(kw("in").parse_next(&mut input).is_ok());
        assert_eq!(input, " (1)");
    }

    #[test]
    fn name_rejects_reserved_words() {
        let mut input = "then";
        assert!(name.parse_next(&mut input).is_err());
        let mut input = "thenable";
        assert_eq!(name.parse_next(&mut input).unwrap(), "thenable");
    }

    #[test]
    fn numbers_keep_integer_and_float_apart() {
        let mut input = "42";
        assert_eq!(number_literal.parse_next(&mut input).unwrap(), Number::Int(42));
        let mut input = "2.5";
        assert_eq!(
            number_literal.parse_next(&mut input).unwrap(),
            Number::Float(2.5)
        );
    }

    #[test]
    fn quoted_string_handles_escapes() {
        let mut input = r#""say \"hi\"\n" rest"#;
        assert_eq!(quoted_string.parse_next(&mut input).unwrap(), "say \"hi\"\n");
        assert_eq!(input, " rest");
    }

    #[test]
    fn comments_are_skipped() {
        let mut input = "  # note\n  x";
        ws_skip.parse_next(&mut input).unwrap();
        assert_eq!(input, "x");
    }
}
