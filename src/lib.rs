//! Message Dictionary
//!
//! Loads a message dictionary (named fields and messages that may reference
//! each other by identifier) and resolves it into a shared, immutable node
//! graph for message construction, validation and comparison.
//!
//! ## Features
//!
//! - **Single Materialization**: each identified declaration becomes exactly one node
//! - **Cycle Safe**: self- and mutually-referential declarations resolve without recursion blow-up
//! - **Order Preserving**: top-level and child order follow the declarations
//! - **Round Trip**: graphs re-serialize to JSON/YAML with identifier back-references
//! - **Message Factory**: map-backed messages with default nested structures
//!
//! ## Architecture
//!
//! ```text
//! JSON / YAML ──loader──▶ DictionaryDecl ──builder──▶ DictionaryGraph
//!                                                      │  arena of Nodes
//!                                                      │  top-level fields / messages
//!                                                      │  identifier table
//!                                                      ├──▶ writer  (JSON / YAML)
//!                                                      ├──▶ factory (MapMessage)
//!                                                      └──▶ analysis (DOT, reference cycles)
//! ```

pub mod builder;
pub mod config;
pub mod convert;
pub mod declaration;
pub mod error;
pub mod factory;
pub mod graph;
pub mod loader;
pub mod node;
pub mod uri;
pub mod writer;

pub use builder::build;
pub use config::DictionaryConfig;
pub use declaration::{Attribute, Declaration, DictionaryDecl, FieldDecl, MessageDecl, ReferenceDecl};
pub use error::{DictionaryError, Result};
pub use factory::{MapMessage, MessageFactory, MessageValue, MsgMetaData};
pub use graph::{DictionaryGraph, ReferenceCycle, SearchResult};
pub use loader::DictionaryFormat;
pub use node::{FieldType, Node, NodeId, NodeKind};
pub use uri::DictionaryUri;
