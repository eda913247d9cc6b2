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

//! Completion support for the dotlang language server
//!
//! Tokenizes the text left of the cursor and answers what can follow a member
//! access, worker send or package qualifier.

pub mod filter;
pub mod index;
pub mod lexer;
pub mod scope;

pub use filter::{CompletionQuery, Delimiter, DelimiterFilter, FilterOutcome, PackageCompletions};
pub use index::{CompletionIndex, INDEX_FORMAT_VERSION, IndexError, IndexPersistence, IndexedPackage, SymbolIndex};
pub use scope::{ImportBinding, ImportStatement, VisibleSymbol};
