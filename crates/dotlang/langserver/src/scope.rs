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

//! Symbols and imports visible at a cursor position

use crate::lexer::{TokenKind, default_channel_tokens};
use dotlang_compiler::{PackageSymbol, SymbolKind};
use lsp_types::{CompletionItem, CompletionItemKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolCategory {
    Variable,
    Function,
    /// An imported package, visible through its alias
    Package,
    Worker,
    Type,
    Endpoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Method,
    /// Remote method of a client object, invoked with `->`
    RemoteAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
}

impl Member {
    pub fn new(name: impl Into<String>, kind: MemberKind) -> Self {
        Self { name: name.into(), kind }
    }

    pub fn completion_item(&self) -> CompletionItem {
        let kind = match self.kind {
            MemberKind::Field => CompletionItemKind::FIELD,
            MemberKind::Method | MemberKind::RemoteAction => CompletionItemKind::METHOD,
        };
        CompletionItem {
            label: self.name.clone(),
            kind: Some(kind),
            ..CompletionItem::default()
        }
    }
}

/// A symbol in scope at the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleSymbol {
    pub name: String,
    pub category: SymbolCategory,
    /// Client objects expose remote actions through `->`
    pub is_client: bool,
    pub members: Vec<Member>,
    pub detail: Option<String>,
}

impl VisibleSymbol {
    pub fn new(name: impl Into<String>, category: SymbolCategory) -> Self {
        Self {
            name: name.into(),
            category,
            is_client: false,
            members: Vec::new(),
            detail: None,
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::new(name, SymbolCategory::Variable)
    }

    pub fn worker(name: impl Into<String>) -> Self {
        Self::new(name, SymbolCategory::Worker)
    }

    /// An endpoint variable holding a client object
    pub fn client(name: impl Into<String>) -> Self {
        let mut symbol = Self::new(name, SymbolCategory::Endpoint);
        symbol.is_client = true;
        symbol
    }

    /// An imported package bound to `alias`; its exports become members
    pub fn package(alias: impl Into<String>, package: &PackageSymbol) -> Self {
        let mut symbol = Self::new(alias, SymbolCategory::Package).with_detail(package.identity.to_string());
        symbol.members = package
            .exports
            .iter()
            .map(|export| {
                let kind = if export.kind == SymbolKind::Function { MemberKind::Method } else { MemberKind::Field };
                Member::new(&export.name, kind)
            })
            .collect();
        symbol
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn completion_item(&self) -> CompletionItem {
        let kind = match self.category {
            SymbolCategory::Variable | SymbolCategory::Endpoint => CompletionItemKind::VARIABLE,
            SymbolCategory::Function => CompletionItemKind::FUNCTION,
            SymbolCategory::Package => CompletionItemKind::MODULE,
            SymbolCategory::Worker => CompletionItemKind::EVENT,
            SymbolCategory::Type => CompletionItemKind::STRUCT,
        };
        CompletionItem {
            label: self.name.clone(),
            kind: Some(kind),
            detail: self.detail.clone(),
            ..CompletionItem::default()
        }
    }
}

/// An `import` statement of the current file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    /// Empty when the import names no organization
    pub org: String,
    /// Dotted package name, e.g. `lang.int`
    pub package: String,
    pub alias: Option<String>,
}

impl ImportStatement {
    pub fn new(org: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            package: package.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Parse `import org/pkg.name as alias;`. The organization and the alias are optional.
    pub fn parse(source: &str) -> Option<Self> {
        let tokens = default_channel_tokens(source);
        let mut tokens = tokens.iter().peekable();

        if tokens.next().map(|t| t.text.as_str()) != Some("import") {
            return None;
        }

        let mut org = String::new();
        let mut components = Vec::new();
        loop {
            let token = tokens.next()?;
            if !matches!(token.kind, TokenKind::Identifier | TokenKind::Keyword) {
                return None;
            }
            components.push(token.text.clone());

            match tokens.peek().map(|t| t.kind) {
                Some(TokenKind::Slash) if org.is_empty() && components.len() == 1 => {
                    tokens.next();
                    org = components.pop()?;
                }
                Some(TokenKind::Dot) => {
                    tokens.next();
                }
                _ => break,
            }
        }

        let mut statement = Self::new(org, components.join("."));
        if tokens.peek().map(|t| t.text.as_str()) == Some("as") {
            tokens.next();
            let alias = tokens.next().filter(|t| t.kind == TokenKind::Identifier)?;
            statement.alias = Some(alias.text.clone());
        }

        match tokens.next() {
            None => Some(statement),
            Some(t) if t.kind == TokenKind::Semicolon => Some(statement),
            Some(_) => None,
        }
    }

    /// The name this import is referenced by: the alias, or the last package component
    pub fn effective_alias(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => self.package.rsplit('.').next().unwrap_or(&self.package),
        }
    }
}

/// An alias resolved to the package it refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub alias: String,
    pub resolved_org: String,
    pub resolved_package: String,
}

impl ImportBinding {
    pub fn from_statement(statement: &ImportStatement) -> Self {
        Self {
            alias: statement.effective_alias().to_string(),
            resolved_org: statement.org.clone(),
            resolved_package: statement.package.clone(),
        }
    }

    /// Binding for `alias` among the imports of a file; the first matching import wins
    pub fn find(imports: &[ImportStatement], alias: &str) -> Option<Self> {
        imports.iter().find(|statement| statement.effective_alias() == alias).map(Self::from_statement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotlang_common::{ModuleIdentity, Version};
    use dotlang_compiler::ExportedSymbol;

    #[test]
    fn test_parse_import() {
        let statement = ImportStatement::parse("import acme/net.http as web;").unwrap();
        assert_eq!(statement, ImportStatement::new("acme", "net.http").with_alias("web"));

        let statement = ImportStatement::parse("import lang.int").unwrap();
        assert_eq!(statement.org, "");
        assert_eq!(statement.effective_alias(), "int");

        assert!(ImportStatement::parse("var x = 1;").is_none());
        assert!(ImportStatement::parse("import acme/").is_none());
        assert!(ImportStatement::parse("import acme/http as;").is_none());
    }

    #[test]
    fn test_binding_resolves_real_package() {
        let imports = vec![ImportStatement::new("acme", "net.http").with_alias("web"), ImportStatement::new("acme", "log")];

        let binding = ImportBinding::find(&imports, "web").unwrap();
        assert_eq!(binding.resolved_org, "acme");
        assert_eq!(binding.resolved_package, "net.http");

        assert_eq!(ImportBinding::find(&imports, "log").unwrap().alias, "log");
        assert!(ImportBinding::find(&imports, "http").is_none());
    }

    #[test]
    fn test_package_symbol_members() {
        let package = PackageSymbol::new(
            ModuleIdentity::new("acme", "log", "log", Version::new(1, 0, 0)),
            vec![ExportedSymbol::new("printInfo", SymbolKind::Function), ExportedSymbol::new("Level", SymbolKind::Type)],
        );
        let symbol = VisibleSymbol::package("log", &package);

        assert_eq!(symbol.category, SymbolCategory::Package);
        assert_eq!(symbol.members[0], Member::new("printInfo", MemberKind::Method));
        assert_eq!(symbol.completion_item().detail.as_deref(), Some("acme/log:1.0.0"));
    }
}
