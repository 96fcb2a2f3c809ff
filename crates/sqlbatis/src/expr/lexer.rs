use super::ExprError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Str(String),
    True,
    False,
    Null,
    /// Bare identifier (`name`, `user.name`).
    Ident(String),
    /// Bound reference written as `:name`.
    Bound(String),
    LParen,
    RParen,
    Not,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl Token {
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Number(n) => n.to_string(),
            Token::Str(s) => format!("{s:?}"),
            Token::True => "true".into(),
            Token::False => "false".into(),
            Token::Null => "null".into(),
            Token::Ident(name) => name.clone(),
            Token::Bound(name) => format!(":{name}"),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
            Token::Not => "!".into(),
            Token::Eq => "==".into(),
            Token::NotEq => "!=".into(),
            Token::StrictEq => "===".into(),
            Token::StrictNotEq => "!==".into(),
            Token::Lt => "<".into(),
            Token::Le => "<=".into(),
            Token::Gt => ">".into(),
            Token::Ge => ">=".into(),
            Token::And => "&&".into(),
            Token::Or => "||".into(),
        }
    }
}

fn is_placeholder_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    is_placeholder_char(c) || c == '$'
}

pub(crate) fn tokenize(src: &str) -> Result<Vec<Token>, ExprError> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        match c {
            ':' => {
                if chars.get(i + 1) == Some(&':') {
                    let start = i + 2;
                    let mut end = start;
                    while end < chars.len() && is_placeholder_char(chars[end]) {
                        end += 1;
                    }
                    let name: String = chars[start..end].iter().collect();
                    return Err(ExprError::LiteralSubstitution(name));
                }
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && is_placeholder_char(chars[end]) {
                    end += 1;
                }
                if end == start {
                    return Err(ExprError::UnexpectedChar { ch: ':', pos: i });
                }
                tokens.push(Token::Bound(chars[start..end].iter().collect()));
                i = end;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    if chars.get(i + 2) == Some(&'=') {
                        tokens.push(Token::StrictNotEq);
                        i += 3;
                    } else {
                        tokens.push(Token::NotEq);
                        i += 2;
                    }
                } else {
                    tokens.push(Token::Not);
                    i += 1;
                }
            }
            '=' => {
                if chars.get(i + 1) != Some(&'=') {
                    // Assignment is not part of the language.
                    return Err(ExprError::UnexpectedChar { ch: '=', pos: i });
                }
                if chars.get(i + 2) == Some(&'=') {
                    tokens.push(Token::StrictEq);
                    i += 3;
                } else {
                    tokens.push(Token::Eq);
                    i += 2;
                }
            }
            '<' | '>' => {
                let or_equal = chars.get(i + 1) == Some(&'=');
                tokens.push(match (c, or_equal) {
                    ('<', false) => Token::Lt,
                    ('<', true) => Token::Le,
                    ('>', false) => Token::Gt,
                    _ => Token::Ge,
                });
                i += if or_equal { 2 } else { 1 };
            }
            '&' | '|' => {
                if chars.get(i + 1) != Some(&c) {
                    return Err(ExprError::UnexpectedChar { ch: c, pos: i });
                }
                tokens.push(if c == '&' { Token::And } else { Token::Or });
                i += 2;
            }
            '\'' | '"' => {
                let (s, next) = lex_string(&chars, i)?;
                tokens.push(Token::Str(s));
                i = next;
            }
            '-' | '0'..='9' => {
                let (n, next) = lex_number(&chars, i)?;
                tokens.push(Token::Number(n));
                i = next;
            }
            c if is_ident_start(c) => {
                let start = i;
                while i < chars.len() && is_ident_char(chars[i]) {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(match word.as_str() {
                    "true" => Token::True,
                    "false" => Token::False,
                    "null" | "undefined" => Token::Null,
                    _ => Token::Ident(word),
                });
            }
            other => return Err(ExprError::UnexpectedChar { ch: other, pos: i }),
        }
    }

    Ok(tokens)
}

fn lex_string(chars: &[char], start: usize) -> Result<(String, usize), ExprError> {
    let quote = chars[start];
    let mut out = String::new();
    let mut i = start + 1;

    while i < chars.len() {
        match chars[i] {
            '\\' => {
                let Some(&escaped) = chars.get(i + 1) else {
                    break;
                };
                out.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    other => other,
                });
                i += 2;
            }
            c if c == quote => return Ok((out, i + 1)),
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    Err(ExprError::UnterminatedString(start))
}

fn lex_number(chars: &[char], start: usize) -> Result<(f64, usize), ExprError> {
    let mut i = start;
    if chars[i] == '-' {
        i += 1;
    }
    let digits_start = i;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i < chars.len() && chars[i] == '.' {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i == digits_start {
        return Err(ExprError::UnexpectedChar {
            ch: chars[start],
            pos: start,
        });
    }

    let text: String = chars[start..i].iter().collect();
    let n = text.parse::<f64>().map_err(|_| ExprError::InvalidNumber(text))?;
    Ok((n, i))
}
