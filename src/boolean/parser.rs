//! Parser for minimized boolean formulas.
//!
//! Grammar (in rough EBNF):
//!
//! expr     = call | variable
//! call     = NAME "(" expr ("," expr)* ")"
//! NAME     = "And" | "Or" | "Not"        (case-insensitive)
//! variable = IDENT
//!
//! The minimizer's output grammar is fixed, so a parse failure here points at
//! the minimizer rather than at the user's filter.

use super::expr::BoolExpr;
use super::lexer::{Spanned, Token, tokenize};
use super::renderer::{Variable, VariableMap};
use crate::ast::Node;
use crate::error::{OptimizeError, Result};

/// Parser state.
struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Spanned>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .map(|spanned| &spanned.token)
            .unwrap_or(&Token::Eof)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|spanned| spanned.offset)
            .unwrap_or(0)
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        self.pos += 1;
        tok
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        let offset = self.offset();
        let tok = self.advance();
        if tok == expected {
            Ok(())
        } else {
            Err(OptimizeError::parse(
                offset,
                format!("expected {:?}, got {:?}", expected, tok),
            ))
        }
    }

    /// Parse expression: call | variable
    fn parse_expr(&mut self) -> Result<BoolExpr> {
        let offset = self.offset();
        match self.advance() {
            Token::Ident(name) => {
                if matches!(self.peek(), Token::LParen) {
                    self.parse_call(&name, offset)
                } else {
                    Ok(BoolExpr::Var(name))
                }
            }
            other => Err(OptimizeError::parse(
                offset,
                format!("expected name or variable, got {:?}", other),
            )),
        }
    }

    /// Parse call arguments: "(" expr ("," expr)* ")"
    fn parse_call(&mut self, name: &str, offset: usize) -> Result<BoolExpr> {
        self.expect(Token::LParen)?;
        let mut args = vec![self.parse_expr()?];
        while matches!(self.peek(), Token::Comma) {
            self.advance(); // consume ,
            args.push(self.parse_expr()?);
        }
        self.expect(Token::RParen)?;

        match name.to_ascii_lowercase().as_str() {
            "and" => Ok(collapse(args, BoolExpr::And)),
            "or" => Ok(collapse(args, BoolExpr::Or)),
            "not" => {
                if args.len() != 1 {
                    return Err(OptimizeError::parse(
                        offset,
                        format!("Not takes one argument, got {}", args.len()),
                    ));
                }
                Ok(BoolExpr::negate(args.remove(0)))
            }
            _ => Err(OptimizeError::parse(offset, format!("unknown function {}", name))),
        }
    }
}

fn collapse(mut args: Vec<BoolExpr>, build: fn(Vec<BoolExpr>) -> BoolExpr) -> BoolExpr {
    if args.len() == 1 {
        args.remove(0)
    } else {
        build(args)
    }
}

/// Parse formula text into a [`BoolExpr`].
pub fn parse_formula(input: &str) -> Result<BoolExpr> {
    let tokens =
        tokenize(input.trim()).map_err(|(offset, message)| OptimizeError::parse(offset, message))?;
    let mut parser = Parser::new(tokens);

    if matches!(parser.peek(), Token::Eof) {
        return Err(OptimizeError::parse(0, "empty expression"));
    }

    let expr = parser.parse_expr()?;

    // Ensure we consumed all tokens
    if !matches!(parser.peek(), Token::Eof) {
        return Err(OptimizeError::parse(
            parser.offset(),
            format!("unexpected token after expression: {:?}", parser.peek()),
        ));
    }

    Ok(expr)
}

/// Parse minimized formula text and rebuild a filter tree, substituting
/// each variable with a copy of the node it was rendered from.
pub fn parse_minimized(input: &str, variables: &VariableMap) -> Result<Node> {
    let expr = parse_formula(input)?;
    to_tree(&expr, variables)
}

fn to_tree(expr: &BoolExpr, variables: &VariableMap) -> Result<Node> {
    match expr {
        BoolExpr::Var(name) => Ok(lookup(variables, name)?.node.clone()),
        BoolExpr::Not(inner) => match inner.as_ref() {
            BoolExpr::Var(name) => Ok(lookup(variables, name)?.negated.clone()),
            other => Ok(Node::Not(vec![nested(to_tree(other, variables)?)])),
        },
        BoolExpr::And(items) => Ok(Node::And(children(items, variables)?)),
        BoolExpr::Or(items) => Ok(Node::Or(children(items, variables)?)),
    }
}

fn children(items: &[BoolExpr], variables: &VariableMap) -> Result<Vec<Node>> {
    items
        .iter()
        .map(|item| to_tree(item, variables).map(nested))
        .collect()
}

/// Connectives nested in another connective get parenthesized.
fn nested(node: Node) -> Node {
    match node {
        Node::And(_) | Node::Or(_) => Node::LogicalGroup(vec![node]),
        other => other,
    }
}

fn lookup<'a>(variables: &'a VariableMap, name: &str) -> Result<&'a Variable> {
    variables
        .get(name)
        .ok_or_else(|| OptimizeError::parse(0, format!("unknown variable {}", name)))
}
