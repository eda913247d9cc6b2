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

//! Delimiter-based completion filter
//!
//! Decides what to offer after `.`, `!`, `->` or `:`. Member access and worker
//! sends are answered from the symbols visible at the cursor. Package-qualified
//! names are looked up in the persisted [`SymbolIndex`], falling back to the
//! visible symbols when the index has nothing or fails.

use crate::index::{IndexedPackage, IndexedSymbol, SymbolIndex};
use crate::lexer::{Token, TokenKind};
use crate::scope::{ImportBinding, ImportStatement, Member, MemberKind, SymbolCategory, VisibleSymbol};
use dotlang_common::PackageId;
use lsp_types::{CompletionItem, Position, Range, TextEdit};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Dot,
    Not,
    RightArrow,
    Colon,
}

impl Delimiter {
    pub fn token_kind(self) -> TokenKind {
        match self {
            Delimiter::Dot => TokenKind::Dot,
            Delimiter::Not => TokenKind::Not,
            Delimiter::RightArrow => TokenKind::RightArrow,
            Delimiter::Colon => TokenKind::Colon,
        }
    }
}

/// Everything known at the cursor when a delimiter was typed
#[derive(Debug, Clone, Copy)]
pub struct CompletionQuery<'a> {
    /// Tokens left of the cursor, hidden channel included
    pub tokens: &'a [Token],
    pub delimiter: Delimiter,
    pub visible_symbols: &'a [VisibleSymbol],
    pub imports: &'a [ImportStatement],
}

/// Completions of one candidate package
#[derive(Debug, Clone, PartialEq)]
pub struct PackageCompletions {
    pub package: PackageId,
    pub items: Vec<CompletionItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    /// Completion items from the index
    Items(Vec<CompletionItem>),
    /// Index matches from several packages, for the caller to disambiguate
    Grouped(Vec<PackageCompletions>),
    /// Members of a visible symbol
    Members(Vec<Member>),
    /// Visible symbols, e.g. the workers a message can be sent to
    Symbols(Vec<VisibleSymbol>),
}

impl FilterOutcome {
    pub fn empty() -> Self {
        FilterOutcome::Members(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FilterOutcome::Items(items) => items.is_empty(),
            FilterOutcome::Grouped(groups) => groups.is_empty(),
            FilterOutcome::Members(members) => members.is_empty(),
            FilterOutcome::Symbols(symbols) => symbols.is_empty(),
        }
    }

    /// Flatten into completion items; grouped candidates get an import edit inserted at `import_position`
    pub fn into_completion_items(self, import_position: Position) -> Vec<CompletionItem> {
        match self {
            FilterOutcome::Items(items) => items,
            FilterOutcome::Grouped(groups) => with_import_edits(groups, import_position),
            FilterOutcome::Members(members) => members.iter().map(Member::completion_item).collect(),
            FilterOutcome::Symbols(symbols) => symbols.iter().map(VisibleSymbol::completion_item).collect(),
        }
    }
}

/// Attach an `import org/pkg;` edit to every item of every group
pub fn with_import_edits(groups: Vec<PackageCompletions>, position: Position) -> Vec<CompletionItem> {
    groups
        .into_iter()
        .flat_map(|group| {
            let edit = TextEdit {
                range: Range::new(position, position),
                new_text: format!("import {};\n", group.package.import_path()),
            };
            group.items.into_iter().map(move |mut item| {
                item.additional_text_edits.get_or_insert_with(Vec::new).push(edit.clone());
                item
            })
        })
        .collect()
}

/// The default-channel token right before the last occurrence of the delimiter
pub fn symbol_token(tokens: &[Token], delimiter: Delimiter) -> Option<&Token> {
    let visible: Vec<&Token> = tokens.iter().filter(|t| t.is_default_channel()).collect();
    let position = visible.iter().rposition(|t| t.kind == delimiter.token_kind())?;
    position.checked_sub(1).map(|i| visible[i])
}

pub struct DelimiterFilter {
    index: Arc<dyn SymbolIndex>,
}

impl DelimiterFilter {
    pub fn new(index: Arc<dyn SymbolIndex>) -> Self {
        Self { index }
    }

    pub fn filter(&self, query: &CompletionQuery<'_>) -> FilterOutcome {
        let Some(token) = symbol_token(query.tokens, query.delimiter) else {
            return FilterOutcome::empty();
        };
        let name = token.text.as_str();
        debug!("Completing after {:?} on '{}'", query.delimiter, name);

        match query.delimiter {
            Delimiter::Colon => self.package_completions(name, query),
            Delimiter::RightArrow => match find_symbol(query.visible_symbols, name) {
                Some(symbol) if symbol.is_client => members_of(symbol, query.delimiter),
                _ => workers(query.visible_symbols),
            },
            Delimiter::Dot | Delimiter::Not => match find_symbol(query.visible_symbols, name) {
                Some(symbol) => members_of(symbol, query.delimiter),
                None => FilterOutcome::empty(),
            },
        }
    }

    fn package_completions(&self, alias: &str, query: &CompletionQuery<'_>) -> FilterOutcome {
        let binding = ImportBinding::find(query.imports, alias);
        let (org, package) = match &binding {
            Some(binding) => (binding.resolved_org.as_str(), binding.resolved_package.as_str()),
            None => ("", alias),
        };

        let mut entries = match self.index.query(org, package) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Symbol index query for {}/{} failed, using visible symbols: {}", org, package, e);
                Vec::new()
            }
        };
        if entries.is_empty() {
            return live_members(query.visible_symbols, alias, query.delimiter);
        }

        entries.sort_by(|a, b| a.package_id().cmp(&b.package_id()));
        if binding.is_some() {
            let latest = entries.iter().max_by(|a, b| a.version.cmp(&b.version));
            return FilterOutcome::Items(latest.map(flat_items).unwrap_or_default());
        }

        FilterOutcome::Grouped(
            entries
                .iter()
                .map(|entry| PackageCompletions {
                    package: entry.package_id(),
                    items: grouped_items(entry),
                })
                .collect(),
        )
    }
}

fn find_symbol<'a>(symbols: &'a [VisibleSymbol], name: &str) -> Option<&'a VisibleSymbol> {
    symbols.iter().find(|symbol| symbol.name == name)
}

fn members_of(symbol: &VisibleSymbol, delimiter: Delimiter) -> FilterOutcome {
    let remote = delimiter == Delimiter::RightArrow;
    let members = symbol.members.iter().filter(|member| (member.kind == MemberKind::RemoteAction) == remote).cloned().collect();
    FilterOutcome::Members(members)
}

fn workers(symbols: &[VisibleSymbol]) -> FilterOutcome {
    FilterOutcome::Symbols(symbols.iter().filter(|symbol| symbol.category == SymbolCategory::Worker).cloned().collect())
}

fn live_members(symbols: &[VisibleSymbol], name: &str, delimiter: Delimiter) -> FilterOutcome {
    match find_symbol(symbols, name) {
        Some(symbol) => members_of(symbol, delimiter),
        None => FilterOutcome::empty(),
    }
}

fn items<'a>(buckets: impl IntoIterator<Item = &'a Vec<IndexedSymbol>>) -> Vec<CompletionItem> {
    buckets.into_iter().flatten().map(IndexedSymbol::completion_item).collect()
}

fn flat_items(entry: &IndexedPackage) -> Vec<CompletionItem> {
    items([&entry.functions, &entry.records, &entry.objects, &entry.client_endpoints, &entry.other_types])
}

fn grouped_items(entry: &IndexedPackage) -> Vec<CompletionItem> {
    items([&entry.functions, &entry.records, &entry.objects, &entry.other_types])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{CompletionIndex, IndexError, IndexResult};
    use crate::lexer::tokenize;
    use dotlang_common::{ModuleIdentity, Version};
    use dotlang_compiler::{ExportedSymbol, PackageSymbol, SymbolKind};

    struct FailingIndex;

    impl SymbolIndex for FailingIndex {
        fn query(&self, _org: &str, _package: &str) -> IndexResult<Vec<IndexedPackage>> {
            Err(IndexError::Unavailable("index is being rebuilt".to_string()))
        }
    }

    fn http(org: &str) -> PackageSymbol {
        PackageSymbol::new(
            ModuleIdentity::new(org, "http", "http", Version::new(1, 0, 0)),
            vec![
                ExportedSymbol::new("Client", SymbolKind::ClientEndpoint),
                ExportedSymbol::new("Method", SymbolKind::Type),
                ExportedSymbol::new("Response", SymbolKind::Record),
                ExportedSymbol::new("get", SymbolKind::Function),
                ExportedSymbol::new("Listener", SymbolKind::Object),
            ],
        )
    }

    fn filter_with(packages: &[PackageSymbol]) -> DelimiterFilter {
        let index = CompletionIndex::new();
        for package in packages {
            index.insert_package(package);
        }
        DelimiterFilter::new(Arc::new(index))
    }

    fn labels(outcome: FilterOutcome) -> Vec<String> {
        outcome.into_completion_items(Position::new(0, 0)).into_iter().map(|item| item.label).collect()
    }

    fn run(filter: &DelimiterFilter, source: &str, delimiter: Delimiter, symbols: &[VisibleSymbol], imports: &[ImportStatement]) -> FilterOutcome {
        let tokens = tokenize(source);
        filter.filter(&CompletionQuery {
            tokens: &tokens,
            delimiter,
            visible_symbols: symbols,
            imports,
        })
    }

    fn client() -> VisibleSymbol {
        VisibleSymbol::client("ep")
            .with_member(Member::new("timeout", MemberKind::Field))
            .with_member(Member::new("close", MemberKind::Method))
            .with_member(Member::new("post", MemberKind::RemoteAction))
    }

    #[test]
    fn test_symbol_token_uses_last_delimiter() {
        let tokens = tokenize("a.b . c // x\n .");
        assert_eq!(symbol_token(&tokens, Delimiter::Dot).unwrap().text, "c");
        assert!(symbol_token(&tokenize(":"), Delimiter::Colon).is_none());
        assert!(symbol_token(&tokenize("abc"), Delimiter::Colon).is_none());
    }

    #[test]
    fn test_member_access() {
        let filter = filter_with(&[]);
        let symbols = [client()];

        assert_eq!(labels(run(&filter, "ep.", Delimiter::Dot, &symbols, &[])), vec!["timeout", "close"]);
        assert_eq!(labels(run(&filter, "ep !", Delimiter::Not, &symbols, &[])), vec!["timeout", "close"]);
        assert_eq!(labels(run(&filter, "ep->", Delimiter::RightArrow, &symbols, &[])), vec!["post"]);
    }

    #[test]
    fn test_arrow_on_non_client_lists_workers() {
        let filter = filter_with(&[]);
        let symbols = [VisibleSymbol::variable("msg"), VisibleSymbol::worker("w1"), VisibleSymbol::worker("w2")];

        assert_eq!(labels(run(&filter, "msg ->", Delimiter::RightArrow, &symbols, &[])), vec!["w1", "w2"]);
        assert_eq!(labels(run(&filter, "unknown ->", Delimiter::RightArrow, &symbols, &[])), vec!["w1", "w2"]);
    }

    #[test]
    fn test_unknown_symbol_is_empty() {
        let filter = filter_with(&[]);
        assert!(run(&filter, "nope.", Delimiter::Dot, &[client()], &[]).is_empty());
        assert!(run(&filter, ".", Delimiter::Dot, &[client()], &[]).is_empty());
    }

    #[test]
    fn test_resolved_import_gives_flat_list() {
        let filter = filter_with(&[http("acme"), http("globex")]);
        let imports = [ImportStatement::new("acme", "http").with_alias("web")];

        let outcome = run(&filter, "web:", Delimiter::Colon, &[], &imports);
        assert!(matches!(outcome, FilterOutcome::Items(_)));
        assert_eq!(labels(outcome), vec!["get", "Response", "Listener", "Client", "Method"]);
    }

    #[test]
    fn test_unimported_package_is_grouped() {
        let filter = filter_with(&[http("globex"), http("acme")]);

        let outcome = run(&filter, "http:", Delimiter::Colon, &[], &[]);
        let FilterOutcome::Grouped(groups) = outcome else {
            panic!("expected grouped completions");
        };

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].package.org, "acme");
        let group_labels: Vec<_> = groups[0].items.iter().map(|item| item.label.as_str()).collect();
        assert_eq!(group_labels, vec!["get", "Response", "Listener", "Method"]);

        let items = with_import_edits(groups, Position::new(2, 0));
        let edit = &items[0].additional_text_edits.as_ref().unwrap()[0];
        assert_eq!(edit.new_text, "import acme/http;\n");
        assert_eq!(edit.range.start, Position::new(2, 0));
        assert_eq!(items.last().unwrap().additional_text_edits.as_ref().unwrap()[0].new_text, "import globex/http;\n");
    }

    #[test]
    fn test_index_miss_falls_back_to_visible_symbols() {
        let log = PackageSymbol::new(ModuleIdentity::new("acme", "log", "log", Version::new(1, 0, 0)), vec![ExportedSymbol::new("printInfo", SymbolKind::Function)]);
        let symbols = [VisibleSymbol::package("log", &log)];
        let imports = [ImportStatement::new("acme", "log")];

        let empty = run(&filter_with(&[]), "log:", Delimiter::Colon, &symbols, &imports);
        assert_eq!(labels(empty), vec!["printInfo"]);
    }

    #[test]
    fn test_index_failure_falls_back_to_visible_symbols() {
        let log = PackageSymbol::new(ModuleIdentity::new("acme", "log", "log", Version::new(1, 0, 0)), vec![ExportedSymbol::new("printInfo", SymbolKind::Function)]);
        let symbols = [VisibleSymbol::package("log", &log)];

        let failing = DelimiterFilter::new(Arc::new(FailingIndex));
        let from_failure = run(&failing, "log:", Delimiter::Colon, &symbols, &[]);
        let from_empty = run(&filter_with(&[]), "log:", Delimiter::Colon, &symbols, &[]);
        assert_eq!(from_failure, from_empty);
    }
}
