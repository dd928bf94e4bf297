use crate::lexer::{classify_word, is_delimiter, is_space, TokenKind};

/// Quotes a string, escaping the characters the lexer would otherwise
/// interpret: newlines, tabs, double quotes and backslashes.
pub fn escape_string(str: &str) -> String {
    let mut output = String::with_capacity(str.len() + 2);
    output.push('"');

    for c in str.chars() {
        match c {
            '\n' => output.push_str(r#"\n"#),
            '\t' => output.push_str(r#"\t"#),
            '"' => output.push_str(r#"\""#),
            '\\' => output.push_str(r#"\\"#),
            c => output.push(c),
        }
    }

    output.push('"');
    output
}

/// Spells a real so that it lexes back as a real: always with a decimal
/// point and never in exponent notation.
///
/// Non-finite values have no such spelling and come out as `NaN`, `inf`
/// or `-inf`, which read back as symbols.
pub fn format_real(real: f64) -> String {
    let mut output = real.to_string();
    if real.is_finite() && !output.contains('.') {
        output.push_str(".0");
    }
    output
}

pub fn format_bool(bool: bool) -> &'static str {
    if bool {
        "#t"
    } else {
        "#f"
    }
}

/// Whether `symbol` written out verbatim reads back as the same symbol.
pub fn is_bare_symbol(symbol: &str) -> bool {
    !symbol.is_empty()
        && !symbol.starts_with('#')
        && !symbol.bytes().any(|c| is_space(c) || is_delimiter(c))
        && matches!(classify_word(symbol), TokenKind::Symbol(_))
}

#[cfg(test)]
mod test {
    use super::{escape_string, format_real, is_bare_symbol};
    use rstest::rstest;

    #[rstest]
    #[case("string", r#""string""#)]
    #[case("", r#""""#)]
    #[case("a\nb", r#""a\nb""#)]
    #[case("a\tb", r#""a\tb""#)]
    #[case("say \"hi\"", r#""say \"hi\"""#)]
    #[case(r"C:\dir", r#""C:\\dir""#)]
    #[case("carriage\r", "\"carriage\r\"")]
    #[case("(x)", r#""(x)""#)]
    fn test_escape_string(#[case] string: &str, #[case] expected: &str) {
        assert_eq!(expected, escape_string(string));
    }

    #[rstest]
    #[case(1.0, "1.0")]
    #[case(3.14, "3.14")]
    #[case(-0.5, "-0.5")]
    #[case(-0.0, "-0.0")]
    #[case(1e21, "1000000000000000000000.0")]
    #[case(1e-7, "0.0000001")]
    #[case(f64::NAN, "NaN")]
    #[case(f64::INFINITY, "inf")]
    fn test_format_real(#[case] real: f64, #[case] expected: &str) {
        assert_eq!(expected, format_real(real));
    }

    #[rstest]
    #[case("file-version", true)]
    #[case("_", true)]
    #[case("a.b", true)]
    #[case("x1", true)]
    #[case("", false)]
    #[case("42", false)]
    #[case("-1.5", false)]
    #[case("#t", false)]
    #[case("two words", false)]
    #[case("a(b", false)]
    #[case("semi;colon", false)]
    #[case("\"quoted\"", false)]
    fn test_is_bare_symbol(#[case] symbol: &str, #[case] expected: bool) {
        assert_eq!(expected, is_bare_symbol(symbol));
    }
}
