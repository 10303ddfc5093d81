// src/interception/host.rs
//! Host object model
//!
//! The instrumentation framework hands probes shared references to the
//! objects taking part in a call (connections, statements, RPC clients).
//! Probes never own them: identity is the address of the shared allocation.

use std::fmt;
use std::sync::Arc;

/// An object living in the instrumented application
pub trait HostObject: Send + Sync + 'static {
    /// Host-side type name, for logs only
    fn type_name(&self) -> &str;

    /// Whether this object is a prepared (or callable) statement
    fn is_prepared_statement(&self) -> bool {
        false
    }
}

/// Shared reference to a host object
pub type ObjectRef = Arc<dyn HostObject>;

/// Identity token of a host object
///
/// Two clones of the same `ObjectRef` share an id; two distinct objects never
/// do while either allocation is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl ObjectId {
    pub fn of(object: &ObjectRef) -> Self {
        Self(Arc::as_ptr(object) as *const () as usize)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Kinds of host object understood by the bundled [`OpaqueObject`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Connection,
    Statement,
    PreparedStatement,
    CallableStatement,
    RpcClient,
}

/// Host object with no payload beyond its kind
///
/// Useful for hosts whose real objects live outside Rust and are represented
/// by a proxy allocated per object.
#[derive(Debug, Clone)]
pub struct OpaqueObject {
    kind: ObjectKind,
    type_name: String,
}

impl OpaqueObject {
    pub fn new(kind: ObjectKind, type_name: impl Into<String>) -> Self {
        Self {
            kind,
            type_name: type_name.into(),
        }
    }

    pub fn connection() -> ObjectRef {
        Arc::new(Self::new(ObjectKind::Connection, "Connection"))
    }

    pub fn statement() -> ObjectRef {
        Arc::new(Self::new(ObjectKind::Statement, "Statement"))
    }

    pub fn prepared_statement() -> ObjectRef {
        Arc::new(Self::new(ObjectKind::PreparedStatement, "PreparedStatement"))
    }

    pub fn callable_statement() -> ObjectRef {
        Arc::new(Self::new(ObjectKind::CallableStatement, "CallableStatement"))
    }

    pub fn rpc_client() -> ObjectRef {
        Arc::new(Self::new(ObjectKind::RpcClient, "Call"))
    }
}

impl HostObject for OpaqueObject {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn is_prepared_statement(&self) -> bool {
        matches!(
            self.kind,
            ObjectKind::PreparedStatement | ObjectKind::CallableStatement
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_follows_allocation() {
        let a = OpaqueObject::prepared_statement();
        let a_clone = Arc::clone(&a);
        let b = OpaqueObject::prepared_statement();

        assert_eq!(ObjectId::of(&a), ObjectId::of(&a_clone));
        assert_ne!(ObjectId::of(&a), ObjectId::of(&b));
    }

    #[test]
    fn test_prepared_detection() {
        assert!(!OpaqueObject::statement().is_prepared_statement());
        assert!(OpaqueObject::prepared_statement().is_prepared_statement());
        assert!(OpaqueObject::callable_statement().is_prepared_statement());
        assert!(!OpaqueObject::connection().is_prepared_statement());
    }
}
