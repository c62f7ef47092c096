use std::fmt;

use chumsky::prelude::*;

use crate::util::Span;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    Int(i64),
    /// Raw text of a float literal; kept as text so tokens stay hashable
    Float(String),
    Bool(bool),

    Ident(String),

    Var,
    Fun,
    Not,

    Assign,
    Equals,
    And,
    Or,
    Arrow,

    Plus,
    Minus,
    Star,
    Slash,
    Bang,

    ParenOpen,
    ParenClose,
    QuoteOpen,
    QuoteClose,
    BracketOpen,
    BracketClose,
    PersistOpen,

    Comma,
    Semicolon,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Int(x) => write!(f, "{x}"),
            Token::Float(x) => write!(f, "{x}"),
            Token::Bool(x) => write!(f, "{x}"),
            Token::Ident(name) => write!(f, "{name}"),
            Token::Var => write!(f, "var"),
            Token::Fun => write!(f, "fun"),
            Token::Not => write!(f, "not"),
            Token::Assign => write!(f, "="),
            Token::Equals => write!(f, "=="),
            Token::And => write!(f, "&&"),
            Token::Or => write!(f, "||"),
            Token::Arrow => write!(f, "->"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Bang => write!(f, "!"),
            Token::ParenOpen => write!(f, "("),
            Token::ParenClose => write!(f, ")"),
            Token::QuoteOpen => write!(f, "<"),
            Token::QuoteClose => write!(f, ">"),
            Token::BracketOpen => write!(f, "["),
            Token::BracketClose => write!(f, "]"),
            Token::PersistOpen => write!(f, "%["),
            Token::Comma => write!(f, ","),
            Token::Semicolon => write!(f, ";"),
        }
    }
}

pub fn lex() -> impl Parser<char, Vec<(Token, Span)>, Error = Simple<char, Span>> {
    let float = text::int(10)
        .then_ignore(just('.'))
        .then(text::digits(10))
        .map(|(whole, frac): (String, String)| Token::Float(format!("{whole}.{frac}")));

    let integer = text::int(10).from_str().unwrapped().map(Token::Int);

    let symbol = choice((
        just("%[").to(Token::PersistOpen),
        just("==").to(Token::Equals),
        just("&&").to(Token::And),
        just("||").to(Token::Or),
        just("->").to(Token::Arrow),
        one_of("()<>[]=+-*/!,;").map(|symb: char| match symb {
            '(' => Token::ParenOpen,
            ')' => Token::ParenClose,
            '<' => Token::QuoteOpen,
            '>' => Token::QuoteClose,
            '[' => Token::BracketOpen,
            ']' => Token::BracketClose,
            '=' => Token::Assign,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '!' => Token::Bang,
            ',' => Token::Comma,
            ';' => Token::Semicolon,
            _ => unreachable!(),
        }),
    ));

    let kw_or_ident = text::ident().map(|ident: String| match ident.as_str() {
        "var" => Token::Var,
        "fun" => Token::Fun,
        "not" => Token::Not,
        "true" => Token::Bool(true),
        "false" => Token::Bool(false),
        _ => Token::Ident(ident),
    });

    let token = float.or(integer).or(symbol).or(kw_or_ident);

    let comment = just("//").then(take_until(just('\n'))).padded();

    token
        .map_with_span(|tok, span| (tok, span))
        .padded_by(comment.repeated())
        .padded()
        .repeated()
}
