//! Parser for the subset of the GraphQL query language the catalog serves:
//! a single anonymous or named `query` operation with variable definitions,
//! aliases, arguments and nested selection sets. Fragments, directives and
//! mutations are rejected.

use crate::utils::error::{CatalogError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
    Enum(String),
    Variable(String),
    List(Vec<InputValue>),
    Object(Vec<(String, InputValue)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub alias: Option<String>,
    pub name: String,
    pub arguments: Vec<(String, InputValue)>,
    pub selection_set: Vec<Field>,
}

impl Field {
    /// Key under which the field's value appears in the response.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn argument(&self, name: &str) -> Option<&InputValue> {
        self.arguments
            .iter()
            .find(|(arg, _)| arg == name)
            .map(|(_, value)| value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDefinition {
    pub name: String,
    pub type_name: String,
    pub default_value: Option<InputValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub operation_name: Option<String>,
    pub variable_definitions: Vec<VariableDefinition>,
    pub selection_set: Vec<Field>,
}

impl Document {
    pub fn variable(&self, name: &str) -> Option<&VariableDefinition> {
        self.variable_definitions.iter().find(|def| def.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Punct(char),
    Spread,
    Name(String),
    Int(i64),
    Float(f64),
    Str(String),
}

fn syntax_error(position: usize, message: impl Into<String>) -> CatalogError {
    CatalogError::QuerySyntax {
        position,
        message: message.into(),
    }
}

fn tokenize(source: &str) -> Result<Vec<(usize, Token)>> {
    let chars: Vec<(usize, char)> = source.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];
        match c {
            // commas are insignificant in GraphQL
            ' ' | '\t' | '\n' | '\r' | ',' | '\u{feff}' => i += 1,
            '#' => {
                while i < chars.len() && chars[i].1 != '\n' {
                    i += 1;
                }
            }
            '{' | '}' | '(' | ')' | '[' | ']' | ':' | '!' | '$' | '=' | '@' => {
                tokens.push((pos, Token::Punct(c)));
                i += 1;
            }
            '.' => {
                let is_spread = chars.get(i + 1).map(|&(_, c)| c) == Some('.')
                    && chars.get(i + 2).map(|&(_, c)| c) == Some('.');
                if !is_spread {
                    return Err(syntax_error(pos, "unexpected '.'"));
                }
                tokens.push((pos, Token::Spread));
                i += 3;
            }
            '"' => {
                let (value, next) = lex_string(&chars, i)?;
                tokens.push((pos, Token::Str(value)));
                i = next;
            }
            c if c == '-' || c.is_ascii_digit() => {
                let start = i;
                i += 1;
                while i < chars.len()
                    && (chars[i].1.is_ascii_digit() || matches!(chars[i].1, '.' | 'e' | 'E' | '+' | '-'))
                {
                    i += 1;
                }
                let end = chars.get(i).map(|&(p, _)| p).unwrap_or(source.len());
                let text = &source[pos..end];
                let token = if text.contains(['.', 'e', 'E']) {
                    text.parse::<f64>()
                        .map(Token::Float)
                        .map_err(|_| syntax_error(chars[start].0, format!("invalid number '{}'", text)))?
                } else {
                    text.parse::<i64>()
                        .map(Token::Int)
                        .map_err(|_| syntax_error(chars[start].0, format!("invalid integer '{}'", text)))?
                };
                tokens.push((pos, token));
            }
            c if c == '_' || c.is_ascii_alphabetic() => {
                let mut name = String::new();
                while i < chars.len() && (chars[i].1 == '_' || chars[i].1.is_ascii_alphanumeric()) {
                    name.push(chars[i].1);
                    i += 1;
                }
                tokens.push((pos, Token::Name(name)));
            }
            other => return Err(syntax_error(pos, format!("unexpected character '{}'", other))),
        }
    }

    Ok(tokens)
}

fn lex_string(chars: &[(usize, char)], start: usize) -> Result<(String, usize)> {
    let mut value = String::new();
    let mut i = start + 1;

    while i < chars.len() {
        let (pos, c) = chars[i];
        match c {
            '"' => return Ok((value, i + 1)),
            '\n' => return Err(syntax_error(pos, "unterminated string")),
            '\\' => {
                let escaped = chars
                    .get(i + 1)
                    .map(|&(_, c)| c)
                    .ok_or_else(|| syntax_error(pos, "unterminated string"))?;
                match escaped {
                    '"' => value.push('"'),
                    '\\' => value.push('\\'),
                    '/' => value.push('/'),
                    'b' => value.push('\u{8}'),
                    'f' => value.push('\u{c}'),
                    'n' => value.push('\n'),
                    'r' => value.push('\r'),
                    't' => value.push('\t'),
                    'u' => {
                        let hex: String = chars.iter().skip(i + 2).take(4).map(|&(_, c)| c).collect();
                        let code = u32::from_str_radix(&hex, 16)
                            .ok()
                            .filter(|_| hex.len() == 4)
                            .and_then(char::from_u32)
                            .ok_or_else(|| syntax_error(pos, format!("invalid unicode escape '\\u{}'", hex)))?;
                        value.push(code);
                        i += 4;
                    }
                    other => return Err(syntax_error(pos, format!("invalid escape '\\{}'", other))),
                }
                i += 2;
            }
            c => {
                value.push(c);
                i += 1;
            }
        }
    }

    Err(syntax_error(chars[start].0, "unterminated string"))
}

/// Deepest nesting of selection sets, list/object values and list types
/// accepted in one document.
pub const MAX_DEPTH: usize = 64;

struct Parser {
    tokens: Vec<(usize, Token)>,
    cursor: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor).map(|(_, token)| token)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.cursor)
            .map(|&(pos, _)| pos)
            .unwrap_or(self.end)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).map(|(_, token)| token.clone());
        self.cursor += 1;
        token
    }

    fn descend(&mut self, position: usize) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(syntax_error(position, "document nested too deeply"));
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    fn is_punct(&self, c: char) -> bool {
        self.peek() == Some(&Token::Punct(c))
    }

    fn expect_punct(&mut self, c: char) -> Result<()> {
        let position = self.position();
        match self.next() {
            Some(Token::Punct(found)) if found == c => Ok(()),
            Some(other) => Err(syntax_error(position, format!("expected '{}', found {}", c, describe(&other)))),
            None => Err(syntax_error(position, format!("expected '{}', found end of document", c))),
        }
    }

    fn expect_name(&mut self) -> Result<String> {
        let position = self.position();
        match self.next() {
            Some(Token::Name(name)) => Ok(name),
            Some(other) => Err(syntax_error(position, format!("expected name, found {}", describe(&other)))),
            None => Err(syntax_error(position, "expected name, found end of document")),
        }
    }

    fn parse_document(&mut self) -> Result<Document> {
        let mut document = Document {
            operation_name: None,
            variable_definitions: Vec::new(),
            selection_set: Vec::new(),
        };

        match self.peek().cloned() {
            Some(Token::Punct('{')) => {}
            Some(Token::Name(keyword)) if keyword == "query" => {
                self.next();
                if let Some(Token::Name(_)) = self.peek() {
                    document.operation_name = Some(self.expect_name()?);
                }
                if self.is_punct('(') {
                    document.variable_definitions = self.parse_variable_definitions()?;
                }
            }
            Some(Token::Name(keyword)) if keyword == "mutation" || keyword == "subscription" => {
                return Err(syntax_error(
                    self.position(),
                    format!("'{}' operations are not supported, the catalog is read-only", keyword),
                ));
            }
            Some(Token::Name(keyword)) if keyword == "fragment" => {
                return Err(syntax_error(self.position(), "fragments are not supported"));
            }
            Some(other) => {
                return Err(syntax_error(self.position(), format!("unexpected {}", describe(&other))));
            }
            None => return Err(syntax_error(self.end, "document contains no operation")),
        }

        if self.is_punct('@') {
            return Err(syntax_error(self.position(), "directives are not supported"));
        }

        document.selection_set = self.parse_selection_set()?;

        if self.peek().is_some() {
            return Err(syntax_error(
                self.position(),
                "only a single operation per document is supported",
            ));
        }

        Ok(document)
    }

    fn parse_variable_definitions(&mut self) -> Result<Vec<VariableDefinition>> {
        self.expect_punct('(')?;
        let mut definitions = Vec::new();

        while !self.is_punct(')') {
            self.expect_punct('$')?;
            let name = self.expect_name()?;
            self.expect_punct(':')?;
            let type_name = self.parse_type()?;
            let default_value = if self.is_punct('=') {
                self.next();
                Some(self.parse_value(true)?)
            } else {
                None
            };
            definitions.push(VariableDefinition {
                name,
                type_name,
                default_value,
            });
        }

        self.expect_punct(')')?;
        Ok(definitions)
    }

    fn parse_type(&mut self) -> Result<String> {
        let mut type_name = if self.is_punct('[') {
            self.descend(self.position())?;
            self.next();
            let inner = self.parse_type()?;
            self.expect_punct(']')?;
            self.ascend();
            format!("[{}]", inner)
        } else {
            self.expect_name()?
        };

        if self.is_punct('!') {
            self.next();
            type_name.push('!');
        }
        Ok(type_name)
    }

    fn parse_selection_set(&mut self) -> Result<Vec<Field>> {
        self.descend(self.position())?;
        self.expect_punct('{')?;
        let mut fields = Vec::new();

        loop {
            match self.peek() {
                Some(Token::Punct('}')) => {
                    self.next();
                    break;
                }
                Some(Token::Spread) => {
                    return Err(syntax_error(self.position(), "fragments are not supported"));
                }
                Some(_) => fields.push(self.parse_field()?),
                None => return Err(syntax_error(self.end, "unterminated selection set")),
            }
        }

        if fields.is_empty() {
            return Err(syntax_error(self.position(), "selection set cannot be empty"));
        }
        self.ascend();
        Ok(fields)
    }

    fn parse_field(&mut self) -> Result<Field> {
        let first = self.expect_name()?;
        let (alias, name) = if self.is_punct(':') {
            self.next();
            (Some(first), self.expect_name()?)
        } else {
            (None, first)
        };

        let mut arguments = Vec::new();
        if self.is_punct('(') {
            self.next();
            while !self.is_punct(')') {
                let arg = self.expect_name()?;
                self.expect_punct(':')?;
                let value = self.parse_value(false)?;
                arguments.push((arg, value));
            }
            self.expect_punct(')')?;
        }

        if self.is_punct('@') {
            return Err(syntax_error(self.position(), "directives are not supported"));
        }

        let selection_set = if self.is_punct('{') {
            self.parse_selection_set()?
        } else {
            Vec::new()
        };

        Ok(Field {
            alias,
            name,
            arguments,
            selection_set,
        })
    }

    fn parse_value(&mut self, constant: bool) -> Result<InputValue> {
        let position = self.position();
        match self.next() {
            Some(Token::Int(i)) => Ok(InputValue::Int(i)),
            Some(Token::Float(f)) => Ok(InputValue::Float(f)),
            Some(Token::Str(s)) => Ok(InputValue::String(s)),
            Some(Token::Name(name)) => Ok(match name.as_str() {
                "true" => InputValue::Boolean(true),
                "false" => InputValue::Boolean(false),
                "null" => InputValue::Null,
                _ => InputValue::Enum(name),
            }),
            Some(Token::Punct('$')) if !constant => Ok(InputValue::Variable(self.expect_name()?)),
            Some(Token::Punct('$')) => Err(syntax_error(position, "variables are not allowed in default values")),
            Some(Token::Punct('[')) => {
                self.descend(position)?;
                let mut items = Vec::new();
                while !self.is_punct(']') {
                    if self.peek().is_none() {
                        return Err(syntax_error(self.end, "unterminated list"));
                    }
                    items.push(self.parse_value(constant)?);
                }
                self.expect_punct(']')?;
                self.ascend();
                Ok(InputValue::List(items))
            }
            Some(Token::Punct('{')) => {
                self.descend(position)?;
                let mut entries = Vec::new();
                while !self.is_punct('}') {
                    let key = self.expect_name()?;
                    self.expect_punct(':')?;
                    entries.push((key, self.parse_value(constant)?));
                }
                self.expect_punct('}')?;
                self.ascend();
                Ok(InputValue::Object(entries))
            }
            Some(other) => Err(syntax_error(position, format!("expected value, found {}", describe(&other)))),
            None => Err(syntax_error(position, "expected value, found end of document")),
        }
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Punct(c) => format!("'{}'", c),
        Token::Spread => "'...'".to_string(),
        Token::Name(name) => format!("'{}'", name),
        Token::Int(i) => i.to_string(),
        Token::Float(f) => f.to_string(),
        Token::Str(s) => format!("\"{}\"", s),
    }
}

pub fn parse_document(source: &str) -> Result<Document> {
    let tokens = tokenize(source)?;
    Parser {
        tokens,
        cursor: 0,
        end: source.len(),
        depth: 0,
    }
    .parse_document()
}
