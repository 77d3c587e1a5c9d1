//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::ast::{BinaryOp, Identifier, Literal, Spanned};
use crate::error::ParseError;
use crate::host::{self, Element, ElementKind, Program, Stmt};
use crate::parser::lexer::{self, Token};
use crate::parser::syntax::{Syntax, SyntaxNode, TypeName, UnaryOp};

type Extra<'a> = extra::Err<Rich<'a, Token>>;

/// Parse a single expression, consuming the whole input
pub fn parse_expression(input: &str) -> Result<SyntaxNode, Vec<ParseError>> {
    let tokens = tokenize(input)?;
    let len = input.len();

    // Turn the token list into a stream that chumsky can use
    let token_stream = Stream::from_iter(tokens.into_iter().map(|(tok, span)| (tok, span.into())))
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    expr_parser()
        .then_ignore(end())
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Parse host source into a program
pub fn parse_program(input: &str) -> Result<Program, Vec<ParseError>> {
    let tokens = tokenize(input)?;
    let len = input.len();

    let token_stream = Stream::from_iter(tokens.into_iter().map(|(tok, span)| (tok, span.into())))
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    program_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

fn tokenize(input: &str) -> Result<Vec<(Token, lexer::Span)>, Vec<ParseError>> {
    lexer::lex(input).map_err(|span| {
        let found = input.get(span.clone()).unwrap_or_default();
        vec![ParseError::custom(
            span,
            format!("Unexpected input '{}'", found),
        )]
    })
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn boxed(node: SyntaxNode) -> Box<SyntaxNode> {
    Box::new(node)
}

/// Suffix of a postfix chain
#[derive(Debug, Clone)]
enum Postfix {
    /// `.name` or `.name(args)`
    Member(String, Option<Vec<SyntaxNode>>),
    Index(SyntaxNode),
    Inc,
    Dec,
    /// `::name`
    MethodRef(String),
}

/// Right-hand part of a relational expression
#[derive(Debug, Clone)]
enum Relation {
    Compare(BinaryOp, SyntaxNode),
    InstanceOf(TypeName, std::ops::Range<usize>),
}

/// One left-associative binary precedence level
fn binary_level<'a, I, P, O>(
    operand: P,
    op: O,
) -> impl Parser<'a, I, SyntaxNode, Extra<'a>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
    P: Parser<'a, I, SyntaxNode, Extra<'a>> + Clone,
    O: Parser<'a, I, BinaryOp, Extra<'a>> + Clone,
{
    operand
        .clone()
        .foldl(op.then(operand).repeated(), |lhs, (op, rhs)| {
            let span = lhs.span.start..rhs.span.end;
            Spanned::new(
                Syntax::Binary {
                    op,
                    lhs: boxed(lhs),
                    rhs: boxed(rhs),
                },
                span,
            )
        })
}

fn type_name_parser<'a, I>() -> impl Parser<'a, I, TypeName, Extra<'a>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    select! { Token::Ident(s) => s }
        .separated_by(just(Token::Dot))
        .at_least(1)
        .collect::<Vec<_>>()
        .then(
            just(Token::BracketOpen)
                .then(just(Token::BracketClose))
                .repeated()
                .collect::<Vec<_>>(),
        )
        .map(|(path, dims)| TypeName {
            path: path.join("."),
            dims: dims.len(),
        })
}

pub(crate) fn expr_parser<'a, I>() -> impl Parser<'a, I, SyntaxNode, Extra<'a>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    recursive(|expr| {
        let name = select! { Token::Ident(s) => s };

        let args = expr
            .clone()
            .separated_by(just(Token::Comma))
            .collect::<Vec<_>>()
            .delimited_by(just(Token::ParenOpen), just(Token::ParenClose));

        let literal = select! {
            Token::Int(s) => Literal::Int(s),
            Token::Float(s) => Literal::Float(s),
            Token::Char(c) => Literal::Char(c),
            Token::String(s) => Literal::String(s),
            Token::True => Literal::Bool(true),
            Token::False => Literal::Bool(false),
            Token::Null => Literal::Null,
        }
        .map(Syntax::Literal);

        let array_init = expr
            .clone()
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::BraceOpen), just(Token::BraceClose))
            .map(Syntax::ArrayInit);

        // new Type(args) | new Type[n]... | new Type[]{...}
        let creation = just(Token::New)
            .ignore_then(
                name.clone()
                    .separated_by(just(Token::Dot))
                    .at_least(1)
                    .collect::<Vec<_>>(),
            )
            .then_ignore(choice((
                args.clone().ignored(),
                expr.clone()
                    .or_not()
                    .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
                    .repeated()
                    .at_least(1)
                    .then(array_init.clone().or_not())
                    .ignored(),
            )))
            .map(|path| Syntax::New {
                target: path.join("."),
            });

        let name_or_call = name.clone().then(args.clone().or_not()).map(|(name, args)| match args {
            Some(args) => Syntax::Call {
                scope: None,
                name,
                args,
            },
            None => Syntax::Ident(name),
        });

        let paren = expr
            .clone()
            .delimited_by(just(Token::ParenOpen), just(Token::ParenClose))
            .map(|inner| Syntax::Paren(boxed(inner)));

        let primary = choice((
            literal,
            just(Token::This).to(Syntax::This),
            creation,
            name_or_call,
            paren,
            array_init,
        ))
        .map_with(|node, e| Spanned::new(node, span_range(&e.span())))
        .boxed();

        let postfix_op = choice((
            just(Token::Dot)
                .ignore_then(name.clone())
                .then(args.clone().or_not())
                .map(|(name, args)| Postfix::Member(name, args)),
            expr.clone()
                .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
                .map(Postfix::Index),
            just(Token::PlusPlus).to(Postfix::Inc),
            just(Token::MinusMinus).to(Postfix::Dec),
            just(Token::ColonColon)
                .ignore_then(choice((name.clone(), just(Token::New).to("new".to_string()))))
                .map(Postfix::MethodRef),
        ))
        .map_with(|op, e| (op, span_range(&e.span())));

        let postfix = primary
            .foldl(postfix_op.repeated(), |base, (op, op_span)| {
                let span = base.span.start..op_span.end;
                let node = match op {
                    Postfix::Member(name, Some(args)) => Syntax::Call {
                        scope: Some(boxed(base)),
                        name,
                        args,
                    },
                    Postfix::Member(name, None) => Syntax::Field {
                        scope: boxed(base),
                        name,
                    },
                    Postfix::Index(index) => Syntax::Index {
                        base: boxed(base),
                        index: boxed(index),
                    },
                    Postfix::Inc => Syntax::Unary {
                        op: UnaryOp::PostInc,
                        operand: boxed(base),
                    },
                    Postfix::Dec => Syntax::Unary {
                        op: UnaryOp::PostDec,
                        operand: boxed(base),
                    },
                    Postfix::MethodRef(name) => Syntax::MethodRef {
                        scope: boxed(base),
                        name,
                    },
                };
                Spanned::new(node, span)
            })
            .boxed();

        let unary = recursive(|unary| {
            let prefix = select! {
                Token::Minus => UnaryOp::Neg,
                Token::Plus => UnaryOp::Plus,
                Token::Bang => UnaryOp::Not,
                Token::Tilde => UnaryOp::BitNot,
                Token::PlusPlus => UnaryOp::PreInc,
                Token::MinusMinus => UnaryOp::PreDec,
            }
            .map_with(|op, e| (op, span_range(&e.span())))
            .then(unary.clone())
            .map(|((op, op_span), operand): (_, SyntaxNode)| {
                let span = op_span.start..operand.span.end;
                Spanned::new(
                    Syntax::Unary {
                        op,
                        operand: boxed(operand),
                    },
                    span,
                )
            });

            // `(a) - b` is a subtraction unless `a` names a primitive type
            let cast = type_name_parser()
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose))
                .then(unary)
                .try_map(|(target, operand): (TypeName, SyntaxNode), span| {
                    if !target.is_primitive() && operand.node.starts_with_sign() {
                        return Err(Rich::custom(span, "not a cast"));
                    }
                    Ok(Spanned::new(
                        Syntax::Cast {
                            target,
                            operand: boxed(operand),
                        },
                        span_range(&span),
                    ))
                });

            choice((prefix, cast, postfix))
        })
        .boxed();

        let multiplicative = binary_level(
            unary,
            select! {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                Token::Percent => BinaryOp::Rem,
            },
        )
        .boxed();

        let additive = binary_level(
            multiplicative,
            select! {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
            },
        )
        .boxed();

        let shift = binary_level(
            additive,
            select! {
                Token::Shl => BinaryOp::Shl,
                Token::Shr => BinaryOp::Shr,
                Token::UShr => BinaryOp::UShr,
            },
        )
        .boxed();

        let relation = choice((
            select! {
                Token::Less => BinaryOp::Lt,
                Token::Greater => BinaryOp::Gt,
                Token::LessOrEqual => BinaryOp::Le,
                Token::GreaterOrEqual => BinaryOp::Ge,
            }
            .then(shift.clone())
            .map(|(op, rhs)| Relation::Compare(op, rhs)),
            just(Token::InstanceOf)
                .ignore_then(type_name_parser())
                .map_with(|target, e| Relation::InstanceOf(target, span_range(&e.span()))),
        ));

        let relational = shift
            .foldl(relation.repeated(), |lhs, relation| match relation {
                Relation::Compare(op, rhs) => {
                    let span = lhs.span.start..rhs.span.end;
                    Spanned::new(
                        Syntax::Binary {
                            op,
                            lhs: boxed(lhs),
                            rhs: boxed(rhs),
                        },
                        span,
                    )
                }
                Relation::InstanceOf(target, target_span) => {
                    let span = lhs.span.start..target_span.end;
                    Spanned::new(
                        Syntax::InstanceOf {
                            operand: boxed(lhs),
                            target,
                        },
                        span,
                    )
                }
            })
            .boxed();

        let equality = binary_level(
            relational,
            select! {
                Token::EqEq => BinaryOp::Eq,
                Token::NotEq => BinaryOp::Ne,
            },
        )
        .boxed();
        let bit_and = binary_level(equality, just(Token::Amp).to(BinaryOp::BitAnd)).boxed();
        let bit_xor = binary_level(bit_and, just(Token::Caret).to(BinaryOp::BitXor)).boxed();
        let bit_or = binary_level(bit_xor, just(Token::Pipe).to(BinaryOp::BitOr)).boxed();
        let and = binary_level(bit_or, just(Token::AndAnd).to(BinaryOp::And)).boxed();
        let or = binary_level(and, just(Token::OrOr).to(BinaryOp::Or)).boxed();

        let ternary = or
            .then(
                just(Token::Question)
                    .ignore_then(expr.clone())
                    .then_ignore(just(Token::Colon))
                    .then(expr.clone())
                    .or_not(),
            )
            .map(|(cond, branches)| match branches {
                Some((then, otherwise)) => {
                    let span = cond.span.start..otherwise.span.end;
                    Spanned::new(
                        Syntax::Ternary {
                            cond: boxed(cond),
                            then: boxed(then),
                            otherwise: boxed(otherwise),
                        },
                        span,
                    )
                }
                None => cond,
            });

        let assignment = ternary
            .then(
                choice((just(Token::Assign), just(Token::CompoundAssign)))
                    .ignore_then(expr.clone())
                    .or_not(),
            )
            .map(|(target, value)| match value {
                Some(value) => {
                    let span = target.span.start..value.span.end;
                    Spanned::new(
                        Syntax::Assign {
                            target: boxed(target),
                            value: boxed(value),
                        },
                        span,
                    )
                }
                None => target,
            });

        let lambda = choice((
            name.clone().map(|param| vec![param]),
            name.clone()
                .separated_by(just(Token::Comma))
                .collect::<Vec<_>>()
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
        ))
        .then_ignore(just(Token::Arrow))
        .then(expr)
        .map_with(|(params, body), e| {
            Spanned::new(
                Syntax::Lambda {
                    params,
                    body: boxed(body),
                },
                span_range(&e.span()),
            )
        });

        choice((lambda, assignment))
    })
}

fn program_parser<'a, I>() -> impl Parser<'a, I, Program, Extra<'a>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let identifier = select! {
        Token::Ident(s) => Identifier::new(s),
    }
    .map_with(|id, e| Spanned::new(id, span_range(&e.span())));

    // Host keywords are contextual: they lex as identifiers
    let keyword = |kw: &str| just(Token::Ident(kw.to_string()));

    let host_expr = expr_parser().try_map(|node, _span| {
        host::Expr::from_syntax(node).map_err(|(message, span)| Rich::custom(span.into(), message))
    });

    let statement = choice((
        keyword("let")
            .ignore_then(identifier.clone())
            .then_ignore(just(Token::Assign))
            .then(host_expr.clone())
            .map(|(name, value)| Stmt::Let { name, value }),
        keyword("return")
            .ignore_then(host_expr.clone().or_not())
            .map(Stmt::Return),
        host_expr.clone().map(Stmt::Expr),
    ))
    .then_ignore(just(Token::Semicolon))
    .map_with(|stmt, e| Spanned::new(stmt, span_range(&e.span())));

    let function = keyword("fn")
        .ignore_then(identifier.clone())
        .then(
            identifier
                .clone()
                .separated_by(just(Token::Comma))
                .allow_trailing()
                .collect::<Vec<_>>()
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
        )
        .then(
            statement
                .repeated()
                .collect::<Vec<_>>()
                .delimited_by(just(Token::BraceOpen), just(Token::BraceClose)),
        )
        .map(|((name, params), body)| ElementKind::Function { name, params, body });

    let constant = keyword("const")
        .ignore_then(identifier.clone())
        .then_ignore(just(Token::Assign))
        .then(host_expr)
        .then_ignore(just(Token::Semicolon))
        .map(|(name, value)| ElementKind::Const { name, value });

    let annotation = just(Token::At).ignore_then(identifier);

    let element = annotation
        .repeated()
        .collect::<Vec<_>>()
        .then(choice((function, constant)))
        .map_with(|(annotations, kind), e| {
            Spanned::new(Element { annotations, kind }, span_range(&e.span()))
        });

    element
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(end())
        .map(|elements| Program { elements })
        .boxed()
}
