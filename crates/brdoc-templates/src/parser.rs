//! Parser for the substitution dialect.

use thiserror::Error;

use crate::ast::{CompareOp, Condition, Expr, Filter, Literal, Node};

/// Parse error with enough context to locate the offending construct.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unterminated tag starting at offset {0}")]
    Unterminated(usize),
    #[error("unknown filter: {0}")]
    UnknownFilter(String),
    #[error("malformed expression: {0}")]
    BadExpression(String),
    #[error("malformed tag: {0}")]
    BadTag(String),
    #[error("unexpected tag: {0}")]
    UnexpectedTag(String),
    #[error("unclosed block: {0}")]
    UnclosedBlock(String),
}

#[derive(Debug)]
enum Token {
    Text(String),
    Output(String),
    Tag(String),
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let bytes = input.as_bytes();
    let mut pos = 0;
    let mut text_start = 0;

    while pos < bytes.len() {
        if bytes[pos] == b'{' && pos + 1 < bytes.len() && (bytes[pos + 1] == b'{' || bytes[pos + 1] == b'%') {
            if text_start < pos {
                tokens.push(Token::Text(input[text_start..pos].to_string()));
            }
            let closing = if bytes[pos + 1] == b'{' { "}}" } else { "%}" };
            let inner_start = pos + 2;
            match input[inner_start..].find(closing) {
                Some(offset) => {
                    let inner = input[inner_start..inner_start + offset].trim().to_string();
                    if bytes[pos + 1] == b'{' {
                        tokens.push(Token::Output(inner));
                    } else {
                        tokens.push(Token::Tag(inner));
                    }
                    pos = inner_start + offset + 2;
                    text_start = pos;
                }
                None => return Err(ParseError::Unterminated(pos)),
            }
        } else {
            pos += 1;
        }
    }
    if text_start < input.len() {
        tokens.push(Token::Text(input[text_start..].to_string()));
    }
    Ok(tokens)
}

fn parse_path(text: &str) -> Result<Vec<String>, ParseError> {
    let parts: Vec<String> = text.split('.').map(|p| p.trim().to_string()).collect();
    if parts.is_empty() || parts.iter().any(|p| p.is_empty()) {
        return Err(ParseError::BadExpression(text.to_string()));
    }
    Ok(parts)
}

fn parse_filter(text: &str) -> Result<Filter, ParseError> {
    let text = text.trim();
    if text == "format_date" {
        return Ok(Filter::FormatDate);
    }
    if text == "format_currency" {
        return Ok(Filter::FormatCurrency);
    }
    if let Some(args) = text.strip_prefix("round(").and_then(|rest| rest.strip_suffix(')')) {
        let digits: u32 = args
            .trim()
            .parse()
            .map_err(|_| ParseError::UnknownFilter(text.to_string()))?;
        return Ok(Filter::Round(digits));
    }
    Err(ParseError::UnknownFilter(text.to_string()))
}

fn parse_expr(text: &str) -> Result<Expr, ParseError> {
    let mut parts = text.split('|');
    let path = parse_path(parts.next().unwrap_or_default())?;
    let filters = parts.map(parse_filter).collect::<Result<Vec<_>, _>>()?;
    Ok(Expr { path, filters })
}

fn parse_literal(text: &str) -> Result<Literal, ParseError> {
    let text = text.trim();
    if (text.starts_with('\'') && text.ends_with('\'') && text.len() >= 2)
        || (text.starts_with('"') && text.ends_with('"') && text.len() >= 2)
    {
        return Ok(Literal::String(text[1..text.len() - 1].to_string()));
    }
    text.parse::<f64>()
        .map(Literal::Number)
        .map_err(|_| ParseError::BadTag(format!("not a literal: {text}")))
}

fn parse_condition(text: &str) -> Result<Condition, ParseError> {
    // Comparison operators, longest first so `>=` wins over `>`.
    for (symbol, op) in [
        (">=", CompareOp::Ge),
        ("<=", CompareOp::Le),
        ("==", CompareOp::Eq),
        ("!=", CompareOp::Ne),
        (">", CompareOp::Gt),
        ("<", CompareOp::Lt),
    ] {
        if let Some(idx) = text.find(symbol) {
            let path = parse_path(text[..idx].trim())?;
            let literal = parse_literal(&text[idx + symbol.len()..])?;
            return Ok(Condition::Compare(path, op, literal));
        }
    }
    if let Some(rest) = text.strip_prefix("not ") {
        return Ok(Condition::Falsy(parse_path(rest.trim())?));
    }
    Ok(Condition::Truthy(parse_path(text.trim())?))
}

struct Parser {
    tokens: std::vec::IntoIter<Token>,
}

/// What ended a block body.
enum BlockEnd {
    Eof,
    Else,
    Endif,
    Endfor,
}

impl Parser {
    fn parse_body(&mut self) -> Result<(Vec<Node>, BlockEnd), ParseError> {
        let mut nodes = Vec::new();
        while let Some(token) = self.tokens.next() {
            match token {
                Token::Text(text) => nodes.push(Node::Text(text)),
                Token::Output(expr) => nodes.push(Node::Output(parse_expr(&expr)?)),
                Token::Tag(tag) => {
                    let tag = tag.trim();
                    if tag == "else" {
                        return Ok((nodes, BlockEnd::Else));
                    }
                    if tag == "endif" {
                        return Ok((nodes, BlockEnd::Endif));
                    }
                    if tag == "endfor" {
                        return Ok((nodes, BlockEnd::Endfor));
                    }
                    if let Some(cond) = tag.strip_prefix("if ") {
                        nodes.push(self.parse_if(cond)?);
                    } else if let Some(spec) = tag.strip_prefix("for ") {
                        nodes.push(self.parse_for(spec)?);
                    } else {
                        return Err(ParseError::UnexpectedTag(tag.to_string()));
                    }
                }
            }
        }
        Ok((nodes, BlockEnd::Eof))
    }

    fn parse_if(&mut self, cond: &str) -> Result<Node, ParseError> {
        let condition = parse_condition(cond)?;
        let (then_body, end) = self.parse_body()?;
        match end {
            BlockEnd::Endif => Ok(Node::If {
                condition,
                then_body,
                else_body: Vec::new(),
            }),
            BlockEnd::Else => {
                let (else_body, end) = self.parse_body()?;
                match end {
                    BlockEnd::Endif => Ok(Node::If {
                        condition,
                        then_body,
                        else_body,
                    }),
                    _ => Err(ParseError::UnclosedBlock("if".to_string())),
                }
            }
            _ => Err(ParseError::UnclosedBlock("if".to_string())),
        }
    }

    fn parse_for(&mut self, spec: &str) -> Result<Node, ParseError> {
        let (var, path) = spec
            .split_once(" in ")
            .ok_or_else(|| ParseError::BadTag(format!("for {spec}")))?;
        let (body, end) = self.parse_body()?;
        match end {
            BlockEnd::Endfor => Ok(Node::For {
                var: var.trim().to_string(),
                path: parse_path(path.trim())?,
                body,
            }),
            _ => Err(ParseError::UnclosedBlock("for".to_string())),
        }
    }
}

/// Parse a template body into its node list.
pub fn parse(input: &str) -> Result<Vec<Node>, ParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens: tokens.into_iter(),
    };
    let (nodes, end) = parser.parse_body()?;
    match end {
        BlockEnd::Eof => Ok(nodes),
        BlockEnd::Else => Err(ParseError::UnexpectedTag("else".to_string())),
        BlockEnd::Endif => Err(ParseError::UnexpectedTag("endif".to_string())),
        BlockEnd::Endfor => Err(ParseError::UnexpectedTag("endfor".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        let nodes = parse("# Nagłówek\nzwykły tekst").unwrap();
        assert_eq!(nodes.len(), 1);
        assert!(matches!(&nodes[0], Node::Text(t) if t.contains("Nagłówek")));
    }

    #[test]
    fn output_with_filters() {
        let nodes = parse("{{project.total|format_currency}}").unwrap();
        match &nodes[0] {
            Node::Output(expr) => {
                assert_eq!(expr.path, vec!["project", "total"]);
                assert_eq!(expr.filters, vec![Filter::FormatCurrency]);
            }
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn round_filter_takes_digits() {
        let nodes = parse("{{nexus.nexus|round(4)}}").unwrap();
        match &nodes[0] {
            Node::Output(expr) => assert_eq!(expr.filters, vec![Filter::Round(4)]),
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn if_else_and_for_blocks_nest() {
        let nodes = parse(
            "{% if items %}{% for x in items %}{{x.name}}{% endfor %}{% else %}brak{% endif %}",
        )
        .unwrap();
        match &nodes[0] {
            Node::If {
                then_body,
                else_body,
                ..
            } => {
                assert!(matches!(then_body[0], Node::For { .. }));
                assert!(matches!(&else_body[0], Node::Text(t) if t == "brak"));
            }
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn comparison_condition() {
        let nodes = parse("{% if nexus.nexus >= 1 %}max{% endif %}").unwrap();
        match &nodes[0] {
            Node::If { condition, .. } => {
                assert_eq!(
                    condition,
                    &Condition::Compare(
                        vec!["nexus".to_string(), "nexus".to_string()],
                        CompareOp::Ge,
                        Literal::Number(1.0)
                    )
                );
            }
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn errors_on_unclosed_blocks() {
        assert!(parse("{% if x %}no end").is_err());
        assert!(parse("{% for x in xs %}no end").is_err());
        assert!(parse("{{unterminated").is_err());
        assert!(parse("{{x|bogus_filter}}").is_err());
    }
}
