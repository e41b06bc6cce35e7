//! Search module - query/filter/pagination engine / 搜索模块
//!
//! Architecture / 架构：
//! - `filter`: builds one immutable predicate per query
//! - `source`: record source capability (store or memory), selected once at startup
//! - `executor`: runs count + window passes with that predicate
//!
//! Call direction: API → Executor → Source (unidirectional) / 调用方向

pub mod executor;
pub mod filter;
pub mod memory;
pub mod source;
pub mod store;

pub use executor::{select_source, QueryExecutor};
pub use filter::{Filter, SqlPredicate};
pub use memory::MemorySource;
pub use source::{RecordSource, Selection, SharedSource, SourceKind};
pub use store::StoreSource;
