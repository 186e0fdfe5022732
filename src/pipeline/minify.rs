//! Conservative JavaScript minifier.
//!
//! Removes comments, leading and trailing whitespace and blank lines. Line
//! breaks are kept so automatic semicolon insertion still sees the same
//! statement boundaries. String, template and regex literals pass through
//! untouched.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    Str(char),
    Regex { in_class: bool },
    LineComment,
    BlockComment { saw_newline: bool },
}

/// A `/` after one of these starts a regex literal rather than a division.
const REGEX_PRECEDERS: &[char] = &[
    '(', ',', '=', ':', '[', '!', '&', '|', '?', '{', '}', ';', '+', '-', '*', '%', '<', '>', '~',
    '^',
];

/// Keywords after which a `/` starts a regex literal.
const REGEX_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "instanceof",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "throw",
    "case",
    "do",
    "else",
    "yield",
    "await",
];

pub fn minify_js(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut state = State::Code;
    // Last non-whitespace character emitted as code
    let mut last_significant: Option<char> = None;
    // Identifier or keyword that ends at `last_significant`
    let mut word = String::new();
    let mut in_word = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        match state {
            State::Code => match c {
                '/' if next == Some('/') => {
                    state = State::LineComment;
                    in_word = false;
                    i += 1;
                }
                '/' if next == Some('*') => {
                    state = State::BlockComment { saw_newline: false };
                    in_word = false;
                    i += 1;
                }
                '/' if starts_regex(last_significant, &word) => {
                    state = State::Regex { in_class: false };
                    out.push(c);
                }
                '\'' | '"' | '`' => {
                    state = State::Str(c);
                    out.push(c);
                }
                '\n' => {
                    in_word = false;
                    end_line(&mut out);
                }
                c if c.is_whitespace() => {
                    in_word = false;
                    if !at_line_start(&out) {
                        out.push(c);
                    }
                }
                _ => {
                    if is_ident_char(c) {
                        if !in_word {
                            word.clear();
                        }
                        word.push(c);
                        in_word = true;
                    } else {
                        word.clear();
                        in_word = false;
                    }
                    out.push(c);
                    last_significant = Some(c);
                }
            },
            State::Str(quote) => {
                out.push(c);
                if c == '\\' {
                    if let Some(n) = next {
                        out.push(n);
                        i += 1;
                    }
                } else if c == quote {
                    state = State::Code;
                    last_significant = Some(c);
                    word.clear();
                    in_word = false;
                }
            }
            State::Regex { in_class } => {
                out.push(c);
                match c {
                    '\\' => {
                        if let Some(n) = next {
                            out.push(n);
                            i += 1;
                        }
                    }
                    '[' => state = State::Regex { in_class: true },
                    ']' if in_class => state = State::Regex { in_class: false },
                    '/' if !in_class => {
                        state = State::Code;
                        last_significant = Some(c);
                        word.clear();
                        in_word = false;
                    }
                    // An unterminated regex was a division after all
                    '\n' => {
                        state = State::Code;
                        last_significant = None;
                        word.clear();
                        in_word = false;
                    }
                    _ => {}
                }
            }
            State::LineComment => {
                if c == '\n' {
                    end_line(&mut out);
                    state = State::Code;
                }
            }
            State::BlockComment { saw_newline } => {
                if c == '*' && next == Some('/') {
                    if saw_newline {
                        end_line(&mut out);
                    } else if !at_line_start(&out) {
                        out.push(' ');
                    }
                    state = State::Code;
                    i += 1;
                } else if c == '\n' {
                    state = State::BlockComment { saw_newline: true };
                }
            }
        }
        i += 1;
    }
    end_line(&mut out);
    out
}

fn at_line_start(out: &str) -> bool {
    out.is_empty() || out.ends_with('\n')
}

/// Drop trailing blanks and close the line unless it is empty.
fn end_line(out: &mut String) {
    let trimmed = out.trim_end_matches([' ', '\t', '\r']).len();
    out.truncate(trimmed);
    if !at_line_start(out) {
        out.push('\n');
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Whether a `/` after `last` starts a regex. When `last` ends an
/// identifier, only a keyword in `word` makes it one.
fn starts_regex(last: Option<char>, word: &str) -> bool {
    match last {
        None => true,
        Some(c) if is_ident_char(c) => REGEX_KEYWORDS.contains(&word),
        Some(c) => REGEX_PRECEDERS.contains(&c),
    }
}
