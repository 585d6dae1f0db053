//! Parser for workbook scripts
//!
//! Every line is checked against the statement allow-list. Anything that is
//! not a known statement with well-formed arguments is rejected with a
//! message the model can act on.

use std::sync::LazyLock;

use regex::Regex;

use crate::script::ast::{Align, Border, Capability, ScriptLine, Statement, StyleSpec, Value};
use crate::script::cell::{CellRef, RangeRef, parse_column};
use crate::script::lexer::{Token, tokenize};
use crate::script::ScriptFault;

static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

/// Tallest row Excel accepts, in points
pub const MAX_ROW_HEIGHT: f64 = 409.0;

/// Widest column Excel accepts, in character units
pub const MAX_COLUMN_WIDTH: f64 = 255.0;

/// Font size range Excel accepts, in points
pub const MIN_FONT_SIZE: f64 = 1.0;
pub const MAX_FONT_SIZE: f64 = 409.0;

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#?([0-9A-Fa-f]{6})$").expect("valid color regex"));

/// Parse a whole script; stops at the first bad line
pub fn parse_script(text: &str) -> Result<Vec<ScriptLine>, ScriptFault> {
    let mut lines = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let number = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let statement = parse_line(trimmed).map_err(|message| ScriptFault::at(number, message))?;
        lines.push(ScriptLine { number, statement });
    }

    Ok(lines)
}

/// Parse a single non-empty, non-comment line
pub fn parse_line(line: &str) -> Result<Statement, String> {
    let mut tokens = Cursor::new(tokenize(line)?);
    let keyword = tokens.word("a statement keyword")?;

    let statement = match keyword.as_str() {
        "import" => {
            let name = tokens.word("a capability name")?;
            let capability = Capability::parse(&name).ok_or_else(|| {
                format!(
                    "unknown capability '{}' (available: workbook, styles, layout)",
                    name
                )
            })?;
            Statement::Import(capability)
        }
        "workbook" => Statement::Workbook {
            name: tokens.ident("a workbook name")?,
        },
        "sheet" => Statement::Sheet {
            workbook: tokens.ident("a workbook name")?,
            title: tokens.quoted("a quoted sheet title")?,
        },
        "style" => {
            let name = tokens.ident("a style name")?;
            let spec = parse_style_attrs(&mut tokens)?;
            Statement::Style { name, spec }
        }
        "write" => {
            let cell = CellRef::parse(&tokens.word("a cell reference")?)?;
            let value = parse_value(tokens.next("a value")?)?;
            if let Value::Text(text) = &value {
                if text.starts_with('=') {
                    return Err(format!(
                        "write {} received formula text; use `formula {} \"{}\"` so the formula stays live",
                        cell, cell, text
                    ));
                }
            }
            Statement::Write {
                cell,
                value,
                style: tokens.optional_ident()?,
            }
        }
        "formula" => {
            let cell = CellRef::parse(&tokens.word("a cell reference")?)?;
            let expr = tokens.quoted("a quoted formula like \"=SUM(B2:B11)\"")?;
            if !expr.trim_start().starts_with('=') {
                return Err(format!(
                    "formula for {} must be a literal formula string starting with '=', got \"{}\"",
                    cell, expr
                ));
            }
            Statement::Formula {
                cell,
                expr: expr.trim().to_string(),
                style: tokens.optional_ident()?,
            }
        }
        "merge" => {
            let range = RangeRef::parse(&tokens.word("a range like A1:D1")?)?;
            if range.is_single_cell() {
                return Err(format!("merge range {} must span more than one cell", range));
            }
            Statement::Merge {
                range,
                text: tokens.quoted("quoted text for the merged cell")?,
                style: tokens.optional_ident()?,
            }
        }
        "width" => Statement::Width {
            col: parse_column(&tokens.word("a column like C")?)?,
            width: tokens.bounded_number("a column width", MAX_COLUMN_WIDTH)?,
        },
        "height" => {
            let row_word = tokens.word("a row number")?;
            let row: u32 = row_word
                .parse()
                .ok()
                .filter(|r| *r >= 1)
                .ok_or_else(|| format!("'{}' is not a row number", row_word))?;
            Statement::Height {
                row: row - 1,
                height: tokens.bounded_number("a row height", MAX_ROW_HEIGHT)?,
            }
        }
        "freeze" => Statement::Freeze {
            cell: CellRef::parse(&tokens.word("a cell reference")?)?,
        },
        "filter" => Statement::Filter {
            range: RangeRef::parse(&tokens.word("a range like A1:D11")?)?,
        },
        "save" => {
            let workbook = tokens.ident("a workbook name")?;
            let target = match tokens.next("a target variable name")? {
                Token::Quoted(path) => {
                    return Err(format!(
                        "saving to the file path \"{}\" is not permitted; save into the variable output_buffer",
                        path
                    ));
                }
                Token::Word(name) if IDENT_RE.is_match(&name) => name,
                other => return Err(format!("expected a target variable name, found {}", other.describe())),
            };
            Statement::Save { workbook, target }
        }
        other => return Err(format!("unknown statement '{}'", other)),
    };

    tokens.finish(statement.keyword())?;
    Ok(statement)
}

fn parse_value(token: Token) -> Result<Value, String> {
    match token {
        Token::Quoted(text) => Ok(Value::Text(text)),
        Token::Word(word) => match word.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => word
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Value::Number)
                .ok_or_else(|| format!("expected a quoted string, number, true or false, found '{}'", word)),
        },
        other => Err(format!(
            "expected a quoted string, number, true or false, found {}",
            other.describe()
        )),
    }
}

fn parse_style_attrs(tokens: &mut Cursor) -> Result<StyleSpec, String> {
    let mut spec = StyleSpec::default();

    while let Some(token) = tokens.take() {
        match token {
            Token::Word(flag) => match flag.as_str() {
                "bold" => spec.bold = true,
                "italic" => spec.italic = true,
                "underline" => spec.underline = true,
                "wrap" => spec.wrap = true,
                other => return Err(format!("unknown style flag '{}'", other)),
            },
            Token::Attr { key, value } => match key.as_str() {
                "font_size" => {
                    spec.font_size = Some(
                        value
                            .parse::<f64>()
                            .ok()
                            .filter(|n| (MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(n))
                            .ok_or_else(|| {
                                format!(
                                    "font_size must be between {} and {}, got '{}'",
                                    MIN_FONT_SIZE, MAX_FONT_SIZE, value
                                )
                            })?,
                    )
                }
                "font_color" => spec.font_color = Some(parse_color(&value)?),
                "fill" => spec.fill = Some(parse_color(&value)?),
                "align" => {
                    spec.align = Some(match value.as_str() {
                        "left" => Align::Left,
                        "center" => Align::Center,
                        "right" => Align::Right,
                        other => return Err(format!("align must be left, center or right, got '{}'", other)),
                    })
                }
                "border" => {
                    spec.border = Some(match value.as_str() {
                        "thin" => Border::Thin,
                        "medium" => Border::Medium,
                        "thick" => Border::Thick,
                        other => return Err(format!("border must be thin, medium or thick, got '{}'", other)),
                    })
                }
                "num_format" => spec.num_format = Some(value),
                other => return Err(format!("unknown style attribute '{}'", other)),
            },
            Token::Quoted(text) => return Err(format!("unexpected text \"{}\" in style definition", text)),
        }
    }

    Ok(spec)
}

fn parse_color(value: &str) -> Result<u32, String> {
    let caps = COLOR_RE
        .captures(value)
        .ok_or_else(|| format!("'{}' is not a color like #1F4E78", value))?;
    u32::from_str_radix(&caps[1], 16).map_err(|e| format!("bad color '{}': {}", value, e))
}

/// Sequential token reader
struct Cursor {
    tokens: std::vec::IntoIter<Token>,
}

impl Cursor {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into_iter(),
        }
    }

    fn take(&mut self) -> Option<Token> {
        self.tokens.next()
    }

    fn next(&mut self, expected: &str) -> Result<Token, String> {
        self.take().ok_or_else(|| format!("expected {}", expected))
    }

    fn word(&mut self, expected: &str) -> Result<String, String> {
        match self.next(expected)? {
            Token::Word(w) => Ok(w),
            other => Err(format!("expected {}, found {}", expected, other.describe())),
        }
    }

    fn ident(&mut self, expected: &str) -> Result<String, String> {
        let word = self.word(expected)?;
        if IDENT_RE.is_match(&word) {
            Ok(word)
        } else {
            Err(format!("expected {}, found '{}'", expected, word))
        }
    }

    fn optional_ident(&mut self) -> Result<Option<String>, String> {
        match self.take() {
            None => Ok(None),
            Some(Token::Word(w)) if IDENT_RE.is_match(&w) => Ok(Some(w)),
            Some(other) => Err(format!("expected a style name, found {}", other.describe())),
        }
    }

    fn quoted(&mut self, expected: &str) -> Result<String, String> {
        match self.next(expected)? {
            Token::Quoted(q) => Ok(q),
            other => Err(format!("expected {}, found {}", expected, other.describe())),
        }
    }

    fn bounded_number(&mut self, expected: &str, max: f64) -> Result<f64, String> {
        let word = self.word(expected)?;
        word.parse::<f64>()
            .ok()
            .filter(|n| *n > 0.0 && *n <= max)
            .ok_or_else(|| format!("{} must be a number above 0 and at most {}, got '{}'", expected, max, word))
    }

    fn finish(&mut self, keyword: &str) -> Result<(), String> {
        match self.take() {
            None => Ok(()),
            Some(extra) => Err(format!(
                "unexpected {} after the `{}` statement",
                extra.describe(),
                keyword
            )),
        }
    }
}
