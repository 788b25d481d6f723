use crate::{error::ErrorReporter, token::Token, token_type::TokenType};

/// Turns source text into a flat token stream.
///
/// Scanning always runs to the end of the input: invalid characters and
/// unterminated strings are reported through the sink and skipped.
pub struct Scanner<'a> {
    chars: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
    reporter: &'a mut ErrorReporter,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &str, reporter: &'a mut ErrorReporter) -> Self {
        Scanner {
            chars: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            reporter,
        }
    }

    pub fn scan_tokens(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        self.tokens.push(Token::eof(self.line));

        self.tokens
    }

    fn scan_token(&mut self) {
        let c = self.advance();

        match c {
            '(' => self.add_token(TokenType::LeftParen),
            ')' => self.add_token(TokenType::RightParen),
            '{' => self.add_token(TokenType::LeftBrace),
            '}' => self.add_token(TokenType::RightBrace),
            ',' => self.add_token(TokenType::Comma),
            '.' => self.add_token(TokenType::Dot),
            '-' => self.add_token(TokenType::Minus),
            '+' => self.add_token(TokenType::Plus),
            ';' => self.add_token(TokenType::Semicolon),
            '*' => self.add_token(TokenType::Star),

            '!' => {
                if self.matches('=') {
                    self.add_token(TokenType::BangEqual)
                } else {
                    self.add_token(TokenType::Bang)
                }
            }
            '=' => {
                if self.matches('=') {
                    self.add_token(TokenType::EqualEqual)
                } else {
                    self.add_token(TokenType::Equal)
                }
            }
            '<' => {
                if self.matches('=') {
                    self.add_token(TokenType::LessEqual)
                } else {
                    self.add_token(TokenType::Less)
                }
            }
            '>' => {
                if self.matches('=') {
                    self.add_token(TokenType::GreaterEqual)
                } else {
                    self.add_token(TokenType::Greater)
                }
            }
            '/' => {
                if self.matches('/') {
                    // A comment runs until the end of the line.
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(TokenType::Slash);
                }
            }

            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,

            '"' => self.string(),

            '0'..='9' => self.number(),

            c if c.is_lox_alpha() => self.identifier(),

            _ => self.reporter.error(self.line, "Unexpected character."),
        }
    }

    fn identifier(&mut self) {
        while self.peek().is_lox_alphanumeric() {
            self.advance();
        }

        let text = self.lexeme();

        match keyword(&text) {
            Some(token_type) => self.add_token(token_type),
            None => self.add_token(TokenType::Identifier),
        }
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // Only consume a '.' that starts a fractional part, so `123.` lexes
        // as a number followed by a dot.
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let value = self.lexeme().parse().unwrap();
        self.add_token(TokenType::Number(value));
    }

    fn string(&mut self) {
        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }

            self.advance();
        }

        if self.is_at_end() {
            self.reporter.error(self.line, "Unterminated string.");
            return;
        }

        // The closing ".
        self.advance();

        // Trim the surrounding quotes.
        let value = self.chars[self.start + 1..self.current - 1]
            .iter()
            .collect();
        self.add_token(TokenType::String(value));
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.is_at_end() {
            return false;
        }

        if self.chars[self.current] != expected {
            return false;
        }

        self.current += 1;
        true
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            return '\0';
        }

        self.chars[self.current]
    }

    fn peek_next(&self) -> char {
        if self.current + 1 >= self.chars.len() {
            return '\0';
        }

        self.chars[self.current + 1]
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        c
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    fn lexeme(&self) -> String {
        self.chars[self.start..self.current].iter().collect()
    }

    fn add_token(&mut self, token_type: TokenType) {
        let text = self.lexeme();
        self.tokens.push(Token::new(token_type, text, self.line));
    }
}

fn keyword(text: &str) -> Option<TokenType> {
    match text {
        "and" => Some(TokenType::And),
        "class" => Some(TokenType::Class),
        "else" => Some(TokenType::Else),
        "false" => Some(TokenType::False),
        "for" => Some(TokenType::For),
        "fun" => Some(TokenType::Fun),
        "if" => Some(TokenType::If),
        "nil" => Some(TokenType::Nil),
        "or" => Some(TokenType::Or),
        "print" => Some(TokenType::Print),
        "return" => Some(TokenType::Return),
        "super" => Some(TokenType::Super),
        "this" => Some(TokenType::This),
        "true" => Some(TokenType::True),
        "var" => Some(TokenType::Var),
        "while" => Some(TokenType::While),
        _ => None,
    }
}

trait LoxChar {
    fn is_lox_alpha(&self) -> bool;
    fn is_lox_alphanumeric(&self) -> bool;
}

impl LoxChar for char {
    fn is_lox_alpha(&self) -> bool {
        self.is_ascii_alphabetic() || *self == '_'
    }

    fn is_lox_alphanumeric(&self) -> bool {
        self.is_ascii_alphanumeric() || *self == '_'
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> (Vec<Token>, ErrorReporter) {
        let mut reporter = ErrorReporter::new();
        let tokens = Scanner::new(source, &mut reporter).scan_tokens();
        (tokens, reporter)
    }

    fn kinds(source: &str) -> Vec<TokenType> {
        let (tokens, reporter) = scan(source);
        assert!(!reporter.had_error);
        tokens.into_iter().map(|t| t.token_type).collect()
    }

    #[test]
    fn single_character_tokens() {
        assert_eq!(
            kinds("(){},.-+;*"),
            vec![
                TokenType::LeftParen,
                TokenType::RightParen,
                TokenType::LeftBrace,
                TokenType::RightBrace,
                TokenType::Comma,
                TokenType::Dot,
                TokenType::Minus,
                TokenType::Plus,
                TokenType::Semicolon,
                TokenType::Star,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn one_or_two_character_operators() {
        assert_eq!(
            kinds("! != = == < <= > >= /"),
            vec![
                TokenType::Bang,
                TokenType::BangEqual,
                TokenType::Equal,
                TokenType::EqualEqual,
                TokenType::Less,
                TokenType::LessEqual,
                TokenType::Greater,
                TokenType::GreaterEqual,
                TokenType::Slash,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("var language = nil;"),
            vec![
                TokenType::Var,
                TokenType::Identifier,
                TokenType::Equal,
                TokenType::Nil,
                TokenType::Semicolon,
                TokenType::Eof,
            ]
        );

        // A keyword prefix does not make an identifier a keyword.
        assert_eq!(
            kinds("orchid"),
            vec![TokenType::Identifier, TokenType::Eof]
        );
    }

    #[test]
    fn number_literals() {
        assert_eq!(
            kinds("1 23.5"),
            vec![
                TokenType::Number(1.0),
                TokenType::Number(23.5),
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn trailing_dot_is_not_part_of_a_number() {
        assert_eq!(
            kinds("123."),
            vec![TokenType::Number(123.0), TokenType::Dot, TokenType::Eof]
        );
    }

    #[test]
    fn string_literal_drops_quotes() {
        let (tokens, _) = scan("\"hello\"");
        assert_eq!(tokens[0].token_type, TokenType::String("hello".to_string()));
        assert_eq!(tokens[0].lexeme, "\"hello\"");
    }

    #[test]
    fn multiline_string_bumps_line_counter() {
        let (tokens, _) = scan("\"a\nb\" x");
        assert_eq!(tokens[0].token_type, TokenType::String("a\nb".to_string()));
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn unterminated_string_reports_and_continues() {
        let (tokens, reporter) = scan("\"oops");
        assert!(reporter.had_error);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_type, TokenType::Eof);
    }

    #[test]
    fn unexpected_character_reports_and_continues() {
        let (tokens, reporter) = scan("@ 1");
        assert!(reporter.had_error);
        assert_eq!(
            tokens.iter().map(|t| &t.token_type).collect::<Vec<_>>(),
            vec![&TokenType::Number(1.0), &TokenType::Eof]
        );
    }

    #[test]
    fn comments_and_whitespace_are_skipped() {
        assert_eq!(
            kinds("// nothing to see\n1 // trailing"),
            vec![TokenType::Number(1.0), TokenType::Eof]
        );
    }

    #[test]
    fn lexemes_round_trip_the_source() {
        let source = "var a=1.5;{print a>=2;}//tail";
        let (tokens, _) = scan(source);
        let rebuilt: String = tokens.iter().map(|t| t.lexeme.as_str()).collect();

        let expected: String = source
            .strip_suffix("//tail")
            .unwrap()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        assert_eq!(rebuilt, expected);
    }

    #[test]
    fn eof_carries_the_final_line() {
        let (tokens, _) = scan("1\n2\n");
        assert_eq!(tokens.last().unwrap().line, 3);
    }
}
