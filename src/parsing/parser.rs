use chumsky::prelude::*;

use super::lexer::Token;
use crate::ast::{BinaryOp, EscapeKind, Expr, ExprKind, Literal, Param, UnaryOp};
use crate::util::{NodeId, Span};

/// Prefix operators share one precedence level
#[derive(Debug, Clone, Copy)]
enum Prefix {
    Neg,
    Not,
    Run,
}

pub fn parser() -> impl Parser<Token, Expr, Error = Simple<Token, Span>> + Clone {
    let ident = select! { Token::Ident(name) => name }.labelled("identifier");

    let seq = recursive(|seq| {
        let expr = recursive(|expr| {
            let literal = select! {
                Token::Int(x) => Literal::Int(x),
                Token::Float(raw) => Literal::Float(raw.parse().unwrap()),
                Token::Bool(x) => Literal::Bool(x),
            }
            .labelled("literal");

            let val = literal
                .map(ExprKind::Literal)
                .map_with_span(Expr::new)
                .labelled("value");

            let fun = just(Token::Fun)
                .ignore_then(
                    ident
                        .map_with_span(|name, span: Span| Param {
                            id: NodeId::DUMMY,
                            name,
                            span,
                        })
                        .separated_by(just(Token::Comma))
                        .allow_trailing()
                        .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
                )
                .then_ignore(just(Token::Arrow))
                .then(expr.clone())
                .map(|(params, body)| ExprKind::Fun {
                    params,
                    body: Box::new(body),
                })
                .map_with_span(Expr::new)
                .labelled("function");

            // An optional identifier annotation directly in front of `<`
            // marks the target representation of the quotation.
            let quote = ident
                .or_not()
                .then_ignore(just(Token::QuoteOpen))
                .then(seq.clone())
                .then_ignore(just(Token::QuoteClose))
                .map(|(annotation, body)| ExprKind::Quote {
                    annotation: annotation.unwrap_or_default(),
                    body: Box::new(body),
                })
                .map_with_span(Expr::new)
                .labelled("quotation");

            let splice = seq
                .clone()
                .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
                .map(|body| ExprKind::Escape {
                    kind: EscapeKind::Splice,
                    body: Box::new(body),
                })
                .map_with_span(Expr::new);

            let persist = just(Token::PersistOpen)
                .ignore_then(seq.clone())
                .then_ignore(just(Token::BracketClose))
                .map(|body| ExprKind::Escape {
                    kind: EscapeKind::Persist,
                    body: Box::new(body),
                })
                .map_with_span(Expr::new);

            let var = ident
                .map(|name| ExprKind::Lookup { name })
                .map_with_span(Expr::new);

            let atom = choice((
                val,
                fun,
                quote,
                splice,
                persist,
                seq.clone()
                    .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
                var,
            ));

            let call = atom
                .then(
                    expr.clone()
                        .separated_by(just(Token::Comma))
                        .allow_trailing()
                        .delimited_by(just(Token::ParenOpen), just(Token::ParenClose))
                        .map_with_span(|args, span: Span| (args, span))
                        .repeated(),
                )
                .foldl(|callee, (args, span)| {
                    let span = Span::new(callee.span.start, span.end);
                    let kind = ExprKind::Call {
                        callee: Box::new(callee),
                        args,
                    };
                    Expr::new(kind, span)
                });

            let prefixed = choice((
                just(Token::Minus).to(Prefix::Neg),
                just(Token::Not).to(Prefix::Not),
                just(Token::Bang).to(Prefix::Run),
            ))
            .map_with_span(|op, span: Span| (op, span))
            .repeated()
            .then(call)
            .foldr(|(op, op_span), inner| {
                let span = Span::new(op_span.start, inner.span.end);
                let kind = match op {
                    Prefix::Neg => ExprKind::Unary {
                        op: UnaryOp::Neg,
                        inner: Box::new(inner),
                    },
                    Prefix::Not => ExprKind::Unary {
                        op: UnaryOp::Not,
                        inner: Box::new(inner),
                    },
                    Prefix::Run => ExprKind::Run {
                        inner: Box::new(inner),
                    },
                };
                Expr::new(kind, span)
            });

            let product = prefixed
                .clone()
                .then(
                    just(Token::Star)
                        .to(BinaryOp::Mul)
                        .or(just(Token::Slash).to(BinaryOp::Div))
                        .then(prefixed)
                        .repeated(),
                )
                .foldl(binary);

            let sum = product
                .clone()
                .then(
                    just(Token::Plus)
                        .to(BinaryOp::Add)
                        .or(just(Token::Minus).to(BinaryOp::Sub))
                        .then(product)
                        .repeated(),
                )
                .foldl(binary);

            let equality = sum
                .clone()
                .then(just(Token::Equals).to(BinaryOp::Equals).then(sum).repeated())
                .foldl(binary);

            let and = equality
                .clone()
                .then(just(Token::And).to(BinaryOp::And).then(equality).repeated())
                .foldl(binary);

            let or = and
                .clone()
                .then(just(Token::Or).to(BinaryOp::Or).then(and).repeated())
                .foldl(binary);

            or.labelled("expression")
        });

        let decl = just(Token::Var)
            .map_with_span(|_, span: Span| span.start)
            .then(ident)
            .then_ignore(just(Token::Assign))
            .then(expr.clone())
            .map(|((start, name), bind)| {
                let span = Span::new(start, bind.span.end);
                let kind = ExprKind::Let {
                    name,
                    bind: Box::new(bind),
                };
                Expr::new(kind, span)
            })
            .labelled("declaration");

        let stmt = decl.or(expr);

        stmt.separated_by(just(Token::Semicolon))
            .allow_trailing()
            .at_least(1)
            .map(|stmts: Vec<Expr>| {
                stmts
                    .into_iter()
                    .rev()
                    .reduce(|rhs, lhs| {
                        let span = Span::new(lhs.span.start, rhs.span.end);
                        let kind = ExprKind::Seq {
                            lhs: Box::new(lhs),
                            rhs: Box::new(rhs),
                        };
                        Expr::new(kind, span)
                    })
                    .expect("at least 1")
            })
    });

    seq.then_ignore(end())
}

fn binary(lhs: Expr, (op, rhs): (BinaryOp, Expr)) -> Expr {
    let span = Span::new(lhs.span.start, rhs.span.end);
    let kind = ExprKind::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    };
    Expr::new(kind, span)
}
