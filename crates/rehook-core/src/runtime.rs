use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use slotmap::SlotMap;

use crate::effects::Dep;
use crate::error::{Result, RuntimeError};
use crate::scope::{Body, Scope, ScopeId, SlotEntry};
use crate::state::SetState;

/// Handle to one reactive-state runtime: the scope arena plus the root and
/// active-scope pointers.
///
/// Cloning is cheap and shares the same runtime; separate `Runtime` values
/// are fully independent. Nothing is process-global, so runtimes can be
/// created and tested in isolation.
#[derive(Clone, Default)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

#[derive(Default)]
struct RuntimeInner {
    scopes: RefCell<SlotMap<ScopeId, Scope>>,
    root: Cell<Option<ScopeId>>,
    active: Cell<Option<ScopeId>>,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scope owning `body` and runs it once.
    ///
    /// With no scope active this mounts the root; a second top-level call is
    /// [`RuntimeError::RootAlreadyMounted`] (an independent root belongs on
    /// its own runtime). With a scope active, the new scope becomes its child
    /// and is active exactly for the duration of this call, after which the
    /// parent is active again. The child lives until the parent's next
    /// re-invocation rebuilds its children. When the active scope was itself
    /// dropped mid-run by a re-entrant ancestor write, mounting a child on
    /// it is [`RuntimeError::NoActiveScope`], as from the other accessors.
    pub fn enter(&self, body: impl Fn(&Runtime) -> Result<()> + 'static) -> Result<()> {
        let parent = self.inner.active.get();
        if parent.is_none() && self.inner.root.get().is_some() {
            return Err(RuntimeError::RootAlreadyMounted);
        }
        let body: Body = Rc::new(body);
        let id = {
            let mut scopes = self.inner.scopes.borrow_mut();
            if let Some(parent) = parent
                && !scopes.contains_key(parent)
            {
                // A re-entrant ancestor write dropped the active scope while
                // its body was still running; the resumed body cannot mount
                // children on it.
                return Err(RuntimeError::NoActiveScope);
            }
            let id = scopes.insert(Scope::new(Rc::clone(&body), parent));
            if let Some(parent) = parent
                && let Some(scope) = scopes.get_mut(parent)
            {
                scope.adopt(id);
            }
            id
        };
        if parent.is_none() {
            self.inner.root.set(Some(id));
        }
        self.invoke(id, body)
    }

    /// Declares the next state slot of the active scope.
    ///
    /// Returns the slot's current value (`initial` on the slot's first
    /// invocation, the most recently written value afterwards) and a setter
    /// bound to it. The pairing is positional: the i-th `state` call of a
    /// body always resolves to the i-th slot, which is why a body must
    /// declare the same state in the same order on every invocation.
    pub fn state<T: Clone + 'static>(&self, initial: T) -> Result<(T, SetState<T>)> {
        let id = self.active_scope()?;
        let (slot, value) = {
            let mut scopes = self.inner.scopes.borrow_mut();
            let scope = scopes.get_mut(id).ok_or(RuntimeError::NoActiveScope)?;
            scope.slot(initial)?
        };
        let setter = SetState::new(self.clone(), id, slot, value.clone());
        Ok((value, setter))
    }

    /// Declares the next effect site of the active scope.
    ///
    /// When the site is first recorded, `body` runs iff `deps` is empty (the
    /// empty list means "once, on creation"). On replays, `body` runs iff
    /// some dependency differs by identity from the previous invocation, in
    /// which case the new list replaces the stored one. `body`'s return
    /// value (a would-be cleanup closure, say) is dropped, never invoked.
    pub fn effect<R>(&self, deps: Vec<Dep>, body: impl FnOnce() -> R) -> Result<()> {
        let id = self.active_scope()?;
        let run = {
            let mut scopes = self.inner.scopes.borrow_mut();
            let scope = scopes.get_mut(id).ok_or(RuntimeError::NoActiveScope)?;
            if scope.effect_exists() {
                let site = scope.consume_effect_site();
                let recorded = scope.effect_deps(site);
                if deps.len() != recorded.len() {
                    return Err(RuntimeError::EffectArityMismatch {
                        site,
                        recorded: recorded.len(),
                        declared: deps.len(),
                    });
                }
                if deps.is_empty() {
                    false
                } else if deps.iter().zip(recorded).any(|(new, old)| !new.same(old)) {
                    scope.update_effect_site(site, deps);
                    true
                } else {
                    false
                }
            } else if scope.is_initialized() {
                return Err(RuntimeError::EffectCountMismatch {
                    recorded: scope.effect_count(),
                    declared: scope.effect_cursor() + 1,
                });
            } else {
                let run_now = deps.is_empty();
                scope.create_effect_site(deps);
                run_now
            }
        };
        if run {
            body();
        }
        Ok(())
    }

    /// Logs the scope tree at debug level: per scope, its slots' stored
    /// types, its effect sites' arities, cursors, and lifecycle state.
    pub fn dump_state(&self) {
        log::debug!("{self:?}");
    }

    fn active_scope(&self) -> Result<ScopeId> {
        self.inner.active.get().ok_or(RuntimeError::NoActiveScope)
    }

    /// Overwrites one slot and synchronously re-invokes the owning scope:
    /// rewind the cursors, drop the child subtrees recorded by the previous
    /// invocation, replay the stored body. Writes through a setter whose
    /// scope was discarded, or to an out-of-range slot, are ignored with a
    /// warning. A stale setter must not revive a dead subtree.
    pub(crate) fn write_slot(&self, id: ScopeId, slot: usize, entry: SlotEntry) -> Result<()> {
        let (body, orphans) = {
            let mut scopes = self.inner.scopes.borrow_mut();
            let Some(scope) = scopes.get_mut(id) else {
                log::warn!("set: scope of slot {slot} was discarded; ignoring write");
                return Ok(());
            };
            if !scope.store_slot(slot, entry) {
                log::warn!("set: slot {slot} is out of range; ignoring write");
                return Ok(());
            }
            (scope.body(), scope.take_children())
        };
        for child in orphans {
            self.drop_subtree(child);
        }
        self.invoke(id, body)
    }

    /// Runs `body` with `id` active, restoring the previous active scope
    /// afterwards, on failure too, in which case the finish checks are skipped and
    /// everything mutated so far stays in place.
    ///
    /// Re-entrancy: a setter fired inside `body` (from an effect body,
    /// usually) nests its whole re-invocation right here. The interrupted
    /// invocation resumes with its cursors fully consumed, so anything more
    /// it declares is reported by the count checks rather than misaligned.
    fn invoke(&self, id: ScopeId, body: Body) -> Result<()> {
        let previous = self.inner.active.replace(Some(id));
        let outcome = body(self);
        self.inner.active.set(previous);
        outcome?;
        let mut scopes = self.inner.scopes.borrow_mut();
        match scopes.get_mut(id) {
            Some(scope) => scope.finish_invocation(),
            // A re-entrant update of an ancestor can drop this scope while
            // its body is still running; nothing left to check.
            None => Ok(()),
        }
    }

    fn drop_subtree(&self, id: ScopeId) {
        let mut scopes = self.inner.scopes.borrow_mut();
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            if let Some(scope) = scopes.remove(id) {
                pending.extend_from_slice(scope.children());
            }
        }
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scopes = self.inner.scopes.borrow();
        writeln!(
            f,
            "Runtime {{ scopes: {}, root: {:?}, active: {:?} }}",
            scopes.len(),
            self.inner.root.get(),
            self.inner.active.get(),
        )?;
        match self.inner.root.get() {
            Some(root) => fmt_scope(f, &scopes, root, 1),
            None => Ok(()),
        }
    }
}

fn fmt_scope(
    f: &mut fmt::Formatter<'_>,
    scopes: &SlotMap<ScopeId, Scope>,
    id: ScopeId,
    depth: usize,
) -> fmt::Result {
    let indent = "  ".repeat(depth);
    let Some(scope) = scopes.get(id) else {
        return writeln!(f, "{indent}{id:?}: <discarded>");
    };
    let slots: Vec<&str> = scope.slots().iter().map(|s| s.type_name()).collect();
    let sites: Vec<usize> = scope.effect_sites().iter().map(|deps| deps.len()).collect();
    writeln!(
        f,
        "{indent}{id:?}: parent {:?}, slots {slots:?}, effect arities {sites:?}, cursors {}/{}, initialized {}",
        scope.parent(),
        scope.slot_cursor(),
        scope.effect_cursor(),
        scope.is_initialized(),
    )?;
    for child in scope.children() {
        fmt_scope(f, scopes, *child, depth + 1)?;
    }
    Ok(())
}
