//! Schema engine: rule trees, validation, persistence, and the settings store.
//!
//! The rule tree is a static, read-only KDL resource describing every valid
//! settings path. A node with a `type` property is a leaf rule; any other
//! node is a group:
//!
//! ```kdl
//! volume type="int" default=50 min=0 max=100
//! window {
//!     width type="int" default=1280 min=320 max=7680
//!     theme {
//!         variant type="string" default="dark" {
//!             enum "dark" "light" "system"
//!         }
//!     }
//! }
//! ```
//!
//! User data lives in a JSON file mirroring the rule tree's shape, written
//! with 2-space indentation and sorted keys, and read permissively: a missing
//! or malformed file is treated as empty and healed on the next write.
//!
//! Validation never clamps. Any constraint violation resets the value to the
//! leaf's declared default, so the stored tree always satisfies the rules.

pub mod data;
pub mod persist;
pub mod rules;
pub mod store;
pub mod validate;

pub use data::DataNode;
pub use persist::default_settings_path;
pub use rules::{LeafRule, RuleNode, RuleTree};
pub use store::SchemaStore;
pub use validate::{validate_leaf, validate_tree};
