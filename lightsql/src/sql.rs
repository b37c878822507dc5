///
/// SQL text helpers: statement splitting, identifier quoting and a small
/// scanner over `CREATE TABLE` text for constraint details the engine's
/// pragmas do not report (constraint names, deferrability).
///
/// None of this parses SQL; it only tokenizes far enough to respect
/// string literals, quoted identifiers and comments.
///

use crate::native;

/// Splits `sql` into its statements, dropping empty ones. A `;` only ends
/// a statement when the engine agrees the text up to it is complete, so
/// trigger bodies stay in one piece.
pub(crate) fn split_statements(sql: &str) -> Vec<String> {
    let bytes = sql.as_bytes();
    let mut statements = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                i = skip_quoted(bytes, i, quote);
            }
            b'[' => {
                while i < bytes.len() && bytes[i] != b']' {
                    i += 1;
                }
                i += 1;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_block_comment(bytes, i);
            }
            b';' => {
                i += 1;
                if native::is_complete(&sql[start..i]) {
                    push_statement(&mut statements, &sql[start..i - 1]);
                    start = i;
                }
            }
            _ => i += 1,
        }
    }

    if start < sql.len() {
        push_statement(&mut statements, &sql[start..]);
    }
    statements
}

fn push_statement(statements: &mut Vec<String>, text: &str) {
    if !is_blank(text) {
        statements.push(text.trim().to_string());
    }
}

/// Index just past the closing quote; a doubled quote is an escape.
fn skip_quoted(bytes: &[u8], open: usize, quote: u8) -> usize {
    let mut i = open + 1;
    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

fn skip_block_comment(bytes: &[u8], open: usize) -> usize {
    let mut i = open + 2;
    while i + 1 < bytes.len() {
        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            return i + 2;
        }
        i += 1;
    }
    bytes.len()
}

/// True when `text` holds nothing but whitespace and comments.
pub(crate) fn is_blank(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b if b.is_ascii_whitespace() => i += 1,
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_block_comment(bytes, i),
            _ => return false,
        }
    }
    true
}

pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Quoted(String),
    Punct(u8),
    Other,
}

impl Token {
    fn is_word(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }

    fn name(&self) -> Option<String> {
        match self {
            Token::Word(w) | Token::Quoted(w) => Some(w.clone()),
            _ => None,
        }
    }
}

fn tokenize(sql: &str) -> Vec<Token> {
    let bytes = sql.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b if b.is_ascii_whitespace() => i += 1,
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_block_comment(bytes, i),
            b'\'' => {
                i = skip_quoted(bytes, i, b'\'');
                tokens.push(Token::Other);
            }
            quote @ (b'"' | b'`') => {
                let end = skip_quoted(bytes, i, quote);
                let close = if end > i + 1 && bytes[end - 1] == quote {
                    end - 1
                } else {
                    bytes.len()
                };
                let single = (quote as char).to_string();
                let inner = sql[i + 1..close].replace(&single.repeat(2), &single);
                tokens.push(Token::Quoted(inner));
                i = end;
            }
            b'[' => {
                let close = sql[i..].find(']').map_or(bytes.len(), |p| i + p);
                tokens.push(Token::Quoted(sql[i + 1..close].to_string()));
                i = close + 1;
            }
            b if b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80 => {
                let start = i;
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'$' || bytes[i] >= 0x80)
                {
                    i += 1;
                }
                tokens.push(Token::Word(sql[start..i].to_string()));
            }
            b'(' | b')' | b',' => {
                tokens.push(Token::Punct(b));
                i += 1;
            }
            _ => {
                tokens.push(Token::Other);
                i += 1;
            }
        }
    }
    tokens
}

/// A `REFERENCES` clause as declared, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ForeignKeyDecl {
    pub name: Option<String>,
    pub initially_deferred: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TableConstraints {
    pub primary_key_name: Option<String>,
    pub foreign_keys: Vec<ForeignKeyDecl>,
}

/// Constraint details from the text of a `CREATE TABLE` statement.
pub(crate) fn table_constraints(create_sql: &str) -> TableConstraints {
    const CLEARS_NAME: &[&str] = &[
        "UNIQUE", "CHECK", "NOT", "NULL", "DEFAULT", "COLLATE", "GENERATED", "AS",
    ];

    let tokens = tokenize(create_sql);
    let mut out = TableConstraints::default();
    let mut depth = 0usize;
    let mut pending_name: Option<String> = None;
    let mut in_foreign_key = false;
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        match token {
            Token::Punct(b'(') => depth += 1,
            Token::Punct(b')') => depth = depth.saturating_sub(1),
            Token::Punct(b',') if depth == 1 => {
                pending_name = None;
                in_foreign_key = false;
            }
            Token::Word(_) if depth == 1 => {
                if token.is_word("CONSTRAINT") {
                    pending_name = tokens.get(i + 1).and_then(Token::name);
                    i += 2;
                    continue;
                } else if token.is_word("PRIMARY") {
                    if let Some(name) = pending_name.take() {
                        out.primary_key_name = Some(name);
                    }
                } else if token.is_word("REFERENCES") {
                    out.foreign_keys.push(ForeignKeyDecl {
                        name: pending_name.take(),
                        initially_deferred: false,
                    });
                    in_foreign_key = true;
                } else if token.is_word("DEFERRABLE") && in_foreign_key {
                    let negated = i > 0 && tokens[i - 1].is_word("NOT");
                    let deferred = tokens.get(i + 1).is_some_and(|t| t.is_word("INITIALLY"))
                        && tokens.get(i + 2).is_some_and(|t| t.is_word("DEFERRED"));
                    if !negated && deferred {
                        if let Some(last) = out.foreign_keys.last_mut() {
                            last.initially_deferred = true;
                        }
                    }
                } else if CLEARS_NAME.iter().any(|k| token.is_word(k)) {
                    pending_name = None;
                }
            }
            _ => {}
        }
        i += 1;
    }
    out
}
