//! Line tokenizer for workbook scripts

use std::iter::Peekable;
use std::str::Chars;

/// One token of a script line
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Bare word: keyword, name, cell, number, flag
    Word(String),
    /// Double-quoted string with escapes resolved
    Quoted(String),
    /// `key=value` or `key="value"`
    Attr { key: String, value: String },
}

impl Token {
    /// Short description for error messages
    pub fn describe(&self) -> String {
        match self {
            Token::Word(w) => format!("'{}'", w),
            Token::Quoted(q) => format!("\"{}\"", q),
            Token::Attr { key, value } => format!("'{}={}'", key, value),
        }
    }
}

/// Split one line into tokens
pub fn tokenize(line: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        match chars.peek() {
            None => break,
            Some('"') => tokens.push(Token::Quoted(read_quoted(&mut chars)?)),
            Some(_) => tokens.push(read_word(&mut chars)?),
        }
    }

    Ok(tokens)
}

fn read_word(chars: &mut Peekable<Chars<'_>>) -> Result<Token, String> {
    let mut word = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() || c == '"' {
            break;
        }
        word.push(c);
        chars.next();
    }

    if let Some((key, rest)) = word.split_once('=') {
        let value = if rest.is_empty() && chars.peek() == Some(&'"') {
            read_quoted(chars)?
        } else {
            rest.to_string()
        };
        return Ok(Token::Attr {
            key: key.to_string(),
            value,
        });
    }

    if chars.peek() == Some(&'"') {
        return Err(format!("unexpected quote directly after '{}'", word));
    }

    Ok(Token::Word(word))
}

fn read_quoted(chars: &mut Peekable<Chars<'_>>) -> Result<String, String> {
    chars.next();
    let mut text = String::new();

    while let Some(c) = chars.next() {
        match c {
            '"' => return Ok(text),
            '\\' => match chars.next() {
                Some('n') => text.push('\n'),
                Some('t') => text.push('\t'),
                Some(other) => text.push(other),
                None => break,
            },
            _ => text.push(c),
        }
    }

    Err("unterminated string literal".to_string())
}
