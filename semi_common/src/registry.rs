//! Port registry: at most one device object per physical port.
//!
//! Hardware ports are exclusive: opening the same channel twice fails (or
//! corrupts state) in the driver layer. A [`Registry`] owns the device bound
//! to each port and hands out shared handles, so independent subsystems can
//! ask for "the motor on port 3" without agreeing on who builds it first.
//!
//! Each registry stores one device category. The category's devices form a
//! closed enum (the registry's `Base`, see [`Resource`]) tagged with a
//! [`Kind`]. A request names the kind it expects; a stored device whose kind
//! does not satisfy it is reported as [`RegistryError::TypeConflict`] and is
//! never returned.
//!
//! # Locking
//!
//! Lookup, construction and insertion run inside one critical section per
//! registry. Concurrent fetches of different ports serialize against each
//! other. The constructor therefore runs at most once per port.
//!
//! The registry does not log, retry or recover. Errors go straight back to
//! the caller of [`Registry::fetch`].

use crate::device::DeviceError;
use crate::port::{PortError, PortKey};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

// ─── Category traits ────────────────────────────────────────────────

/// Category tag of a stored device.
pub trait Kind: Copy + Eq + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Whether a device of kind `self` may be handed to a caller expecting
    /// `expected`.
    fn satisfies(self, expected: Self) -> bool {
        self == expected
    }
}

/// Value stored in a registry: a cheaply clonable, tagged device handle.
pub trait Resource: Clone + Send + Sync + 'static {
    /// Tag type of this category.
    type Kind: Kind;

    /// Tag of the device behind this handle.
    fn kind(&self) -> Self::Kind;
}

/// Concrete device type that is one variant of the category `B`.
pub trait Member<B: Resource>: Send + Sync + Sized + 'static {
    /// Tag carried by every device of this type.
    const KIND: B::Kind;

    /// Wrap a shared device into the category enum.
    fn into_base(this: Arc<Self>) -> B;

    /// Borrow the device back out of the category enum.
    ///
    /// Returns `None` if `base` holds another variant.
    fn from_base(base: &B) -> Option<Arc<Self>>;
}

// ─── Error Types ────────────────────────────────────────────────────

/// Registry fetch error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The port already holds a device of an incompatible kind.
    #[error("port {id} already holds a {actual}, cannot use it as {expected}")]
    TypeConflict {
        /// Port identifier
        id: String,
        /// Kind requested by the caller
        expected: String,
        /// Kind of the stored device
        actual: String,
    },

    /// The constructor failed; nothing was stored.
    #[error("failed to construct device on port {id}: {source}")]
    Construction {
        /// Port identifier
        id: String,
        /// Driver-layer failure
        #[source]
        source: DeviceError,
    },

    /// The identifier was rejected before the lock was taken.
    #[error(transparent)]
    InvalidPort(#[from] PortError),
}

impl RegistryError {
    fn conflict<Id: PortKey, K: Kind>(id: &Id, expected: K, actual: K) -> Self {
        Self::TypeConflict {
            id: id.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

// ─── Registry ───────────────────────────────────────────────────────

/// Keyed store holding exactly one device per port identifier.
///
/// Entries are created lazily by [`fetch`](Self::fetch) and never removed.
pub struct Registry<Id: PortKey, B: Resource> {
    entries: Mutex<HashMap<Id, B>>,
}

impl<Id: PortKey, B: Resource> Registry<Id, B> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch the device on `id`, constructing it with `create` if the port
    /// is still free.
    ///
    /// The expected kind is `T::KIND`.
    ///
    /// # Errors
    /// - `InvalidPort` if `id` fails validation
    /// - `TypeConflict` if the port holds a device of another kind
    /// - `Construction` if `create` fails; the port stays free
    pub fn fetch<T, F>(&self, id: Id, create: F) -> Result<Arc<T>, RegistryError>
    where
        T: Member<B>,
        F: FnOnce() -> Result<T, DeviceError>,
    {
        let base = self.fetch_as(id.clone(), T::KIND, || {
            create().map(|device| T::into_base(Arc::new(device)))
        })?;
        T::from_base(&base).ok_or_else(|| RegistryError::conflict(&id, T::KIND, base.kind()))
    }

    /// Category-level fetch: the expected kind is passed as a value and the
    /// stored handle is returned as the category enum.
    ///
    /// A constructor producing a device whose kind does not satisfy
    /// `expected` is a binding mistake at the call site; the device is
    /// dropped, nothing is stored and `TypeConflict` is returned.
    pub fn fetch_as<F>(&self, id: Id, expected: B::Kind, create: F) -> Result<B, RegistryError>
    where
        F: FnOnce() -> Result<B, DeviceError>,
    {
        id.validate()?;

        let mut entries = self.entries.lock();

        if let Some(existing) = entries.get(&id) {
            let actual = existing.kind();
            if actual.satisfies(expected) {
                return Ok(existing.clone());
            }
            return Err(RegistryError::conflict(&id, expected, actual));
        }

        let device = create().map_err(|source| RegistryError::Construction {
            id: id.to_string(),
            source,
        })?;

        let actual = device.kind();
        if !actual.satisfies(expected) {
            return Err(RegistryError::conflict(&id, expected, actual));
        }

        entries.insert(id, device.clone());
        Ok(device)
    }

    /// Point-in-time copy of every entry.
    pub fn snapshot(&self) -> Vec<(Id, B)> {
        self.entries
            .lock()
            .iter()
            .map(|(id, device)| (id.clone(), device.clone()))
            .collect()
    }

    /// Kind of the device bound to `id`, if any.
    pub fn kind_of(&self, id: &Id) -> Option<B::Kind> {
        self.entries.lock().get(id).map(Resource::kind)
    }

    /// True if a device is bound to `id`.
    pub fn contains(&self, id: &Id) -> bool {
        self.entries.lock().contains_key(id)
    }

    /// Number of bound ports.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True if no port is bound yet.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<Id: PortKey, B: Resource> Default for Registry<Id, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: PortKey, B: Resource> fmt::Debug for Registry<Id, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.lock();
        f.debug_map()
            .entries(entries.iter().map(|(id, device)| (id, device.kind())))
            .finish()
    }
}
