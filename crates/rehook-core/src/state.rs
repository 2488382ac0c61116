use crate::error::Result;
use crate::runtime::Runtime;
use crate::scope::{ScopeId, SlotEntry};

/// Setter half of a state declaration.
///
/// Bound to one slot of one scope, and carrying a snapshot of the value the
/// slot held when the setter was declared. Clones share the binding and the
/// snapshot. The setter stays callable after its scope was discarded (a
/// parent re-invocation rebuilds children), but such writes are ignored.
#[derive(Clone)]
pub struct SetState<T> {
    runtime: Runtime,
    scope: ScopeId,
    slot: usize,
    snapshot: T,
}

impl<T: Clone + 'static> SetState<T> {
    pub(crate) fn new(runtime: Runtime, scope: ScopeId, slot: usize, snapshot: T) -> Self {
        Self {
            runtime,
            scope,
            slot,
            snapshot,
        }
    }

    /// Replaces the slot value and synchronously re-invokes the owning
    /// scope's body. Errors raised during the re-invocation surface here.
    pub fn set(&self, value: T) -> Result<()> {
        self.runtime
            .write_slot(self.scope, self.slot, SlotEntry::of(value))
    }

    /// Computes the replacement from the declaration-time snapshot (not
    /// from the slot's current value) and writes it.
    pub fn update(&self, f: impl FnOnce(T) -> T) -> Result<()> {
        self.set(f(self.snapshot.clone()))
    }
}
