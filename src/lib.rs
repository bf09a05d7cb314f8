//! Tiller - a runtime settings engine for interactive applications.
//!
//! Tiller stores a hierarchical tree of user-adjustable settings, validates
//! every value against a declarative rule tree, persists the validated state
//! as JSON, and keeps live UI properties in sync through bidirectional
//! bindings:
//!
//! - [`schema`] - rule tree loading, validation, persistence, and the
//!   [`SchemaStore`] that owns the live settings tree
//! - [`notify`] - broadcast change notification and cancellable subscriptions
//! - [`bind`] - bidirectional sync between a settings path and a property on
//!   any object implementing the [`Bindable`] capability
//! - [`linker`] - owner-scoped registry of subscriptions with guaranteed
//!   bulk teardown
//!
//! # Threading
//!
//! The engine is single-threaded by design: it lives on whatever thread the
//! host application dispatches UI and property-change callbacks on. Change
//! events and property pushes are delivered synchronously on that thread.
//! Handles are `Rc`-based and not `Send`; a multi-threaded host must
//! serialize all access externally.

pub mod bind;
pub mod linker;
pub mod notify;
pub mod schema;
pub mod value;

pub use bind::{BindOptions, Bindable, Binding, bind};
pub use linker::{Linker, OwnerId, OwnerScope};
pub use notify::{ChangeNotifier, Subscription};
pub use schema::rules::{LeafRule, RuleNode, RuleTree};
pub use schema::store::SchemaStore;
pub use value::{Value, ValueKind};

/// Library-level error type for Tiller operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The static rule resource is missing or unparsable. Fatal: stores
    /// cannot be constructed without a valid rule tree.
    #[error("rule resource error: {0}")]
    RuleResource(String),

    /// A dotted path does not resolve to a leaf in the rule tree.
    #[error("no such settings path: {0}")]
    PathNotFound(String),

    /// A bind target does not expose the requested property.
    #[error("target has no bindable property '{0}'")]
    UnknownProperty(String),

    /// A persistence write failed. The in-memory settings tree is still
    /// updated when this is returned from a mutating call.
    #[error("persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Tiller operations.
pub type Result<T> = std::result::Result<T, Error>;
