// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Lexer for completion queries
//!
//! Tokenizes the source text left of the cursor. Whitespace and comments are
//! kept as hidden-channel tokens so offsets stay intact; the completion filter
//! only looks at default-channel tokens.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Number,
    StringLiteral,
    Dot,
    Colon,
    RightArrow,
    Not,
    Semicolon,
    Comma,
    Equal,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Slash,
    Operator,
    Whitespace,
    Comment,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Default,
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset of the first character
    pub start: usize,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, start: usize) -> Self {
        Self { kind, text: text.into(), start }
    }

    pub fn channel(&self) -> Channel {
        match self.kind {
            TokenKind::Whitespace | TokenKind::Comment => Channel::Hidden,
            _ => Channel::Default,
        }
    }

    pub fn is_default_channel(&self) -> bool {
        self.channel() == Channel::Default
    }
}

const KEYWORDS: &[&str] = &[
    "import", "as", "function", "returns", "return", "if", "else", "while", "foreach", "in", "var", "final", "check", "worker", "client", "remote",
    "resource", "public", "isolated", "transaction", "from", "select", "where",
];

pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                let mut end = start;
                while let Some(&(i, c)) = chars.peek() {
                    if !c.is_whitespace() {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                tokens.push(Token::new(TokenKind::Whitespace, &input[start..end], start));
            }
            '/' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '/'))) {
                    let mut end = input.len();
                    while let Some(&(i, c)) = chars.peek() {
                        if c == '\n' {
                            end = i;
                            break;
                        }
                        chars.next();
                    }
                    tokens.push(Token::new(TokenKind::Comment, &input[start..end], start));
                } else {
                    tokens.push(Token::new(TokenKind::Slash, "/", start));
                }
            }
            '-' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '>'))) {
                    chars.next();
                    tokens.push(Token::new(TokenKind::RightArrow, "->", start));
                } else {
                    tokens.push(Token::new(TokenKind::Operator, "-", start));
                }
            }
            '!' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '='))) {
                    chars.next();
                    tokens.push(Token::new(TokenKind::Operator, "!=", start));
                } else {
                    tokens.push(Token::new(TokenKind::Not, "!", start));
                }
            }
            '"' => {
                chars.next();
                let mut end = input.len();
                let mut escaped = false;
                for (i, c) in chars.by_ref() {
                    if c == '"' && !escaped {
                        end = i + 1;
                        break;
                    }
                    escaped = c == '\\' && !escaped;
                }
                tokens.push(Token::new(TokenKind::StringLiteral, &input[start..end], start));
            }
            '0'..='9' => {
                let mut end = start;
                while let Some(&(i, c)) = chars.peek() {
                    if !c.is_ascii_digit() {
                        break;
                    }
                    end = i + 1;
                    chars.next();
                }
                tokens.push(Token::new(TokenKind::Number, &input[start..end], start));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut end = start;
                while let Some(&(i, c)) = chars.peek() {
                    if !(c.is_alphanumeric() || c == '_') {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                let text = &input[start..end];
                let kind = if KEYWORDS.contains(&text) { TokenKind::Keyword } else { TokenKind::Identifier };
                tokens.push(Token::new(kind, text, start));
            }
            _ => {
                chars.next();
                let kind = match ch {
                    '.' => TokenKind::Dot,
                    ':' => TokenKind::Colon,
                    ';' => TokenKind::Semicolon,
                    ',' => TokenKind::Comma,
                    '=' => TokenKind::Equal,
                    '(' => TokenKind::LeftParen,
                    ')' => TokenKind::RightParen,
                    '{' => TokenKind::LeftBrace,
                    '}' => TokenKind::RightBrace,
                    '[' => TokenKind::LeftBracket,
                    ']' => TokenKind::RightBracket,
                    '+' | '*' | '%' | '<' | '>' | '&' | '|' | '?' => TokenKind::Operator,
                    _ => TokenKind::Unknown,
                };
                tokens.push(Token::new(kind, &input[start..start + ch.len_utf8()], start));
            }
        }
    }

    tokens
}

/// Tokens of the default channel only
pub fn default_channel_tokens(input: &str) -> Vec<Token> {
    tokenize(input).into_iter().filter(Token::is_default_channel).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_empty_input() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_tokenize_delimiters() {
        assert_eq!(
            kinds("a.b:c->d!e"),
            vec![
                TokenKind::Identifier,
                TokenKind::Dot,
                TokenKind::Identifier,
                TokenKind::Colon,
                TokenKind::Identifier,
                TokenKind::RightArrow,
                TokenKind::Identifier,
                TokenKind::Not,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_operators_are_not_delimiters() {
        assert_eq!(kinds("a - b != c"), {
            use TokenKind::*;
            vec![Identifier, Whitespace, Operator, Whitespace, Identifier, Whitespace, Operator, Whitespace, Identifier]
        });
    }

    #[test]
    fn test_hidden_channel() {
        let tokens = tokenize("io // print it\n  :");
        assert_eq!(tokens[1].kind, TokenKind::Whitespace);
        assert_eq!(tokens[2].kind, TokenKind::Comment);
        assert_eq!(tokens[2].text, "// print it");
        assert!(!tokens[2].is_default_channel());

        let visible: Vec<_> = default_channel_tokens("io // print it\n  :").into_iter().map(|t| t.text).collect();
        assert_eq!(visible, vec!["io", ":"]);
    }

    #[test]
    fn test_keywords_and_literals() {
        let tokens = default_channel_tokens("import ballerina/io as x; var s = \"a\\\"b\"; 42");
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[2].kind, TokenKind::Slash);
        assert_eq!(tokens[4].text, "as");
        let literal = tokens.iter().find(|t| t.kind == TokenKind::StringLiteral).unwrap();
        assert_eq!(literal.text, "\"a\\\"b\"");
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Number);
    }

    #[test]
    fn test_offsets() {
        let tokens = tokenize("ab  cd");
        assert_eq!(tokens[2].start, 4);
        assert_eq!(tokens[2].text, "cd");
    }

    proptest! {
        #[test]
        fn prop_tokens_cover_input(input in "\\PC{0,64}") {
            let tokens = tokenize(&input);
            let rebuilt: String = tokens.iter().map(|t| t.text.as_str()).collect();
            prop_assert_eq!(rebuilt, input);
        }
    }
}
