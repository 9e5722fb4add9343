//! Menu Model - Component tree and document types for menu designs
//!
//! A menu design describes an application's hierarchical menu: sub-menus,
//! invokable functions with typed arguments, PDF manual references,
//! image-grid "graphic" menus and separators. Components live in an arena
//! addressed by stable [`NodeId`]s; [`MenuDesign`] is the document context
//! through which every mutation flows.

mod node;
mod node_id;
mod menu;
mod leaf;
mod tree;
mod design;
mod error;
pub mod function;

pub use node::*;
pub use node_id::*;
pub use menu::*;
pub use leaf::*;
pub use tree::{MenuTree, NodeStorage};
pub use design::*;
pub use error::*;
pub use function::*;
