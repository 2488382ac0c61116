use std::any::{Any, type_name};
use std::rc::Rc;

use slotmap::new_key_type;
use smallvec::SmallVec;

use crate::effects::Dep;
use crate::error::{Result, RuntimeError};
use crate::runtime::Runtime;

new_key_type! {
    /// Stable handle to a scope in a runtime's arena.
    pub struct ScopeId;
}

/// A scope body. Re-invoked from the top on every write to one of the
/// scope's slots, so it has to be `Fn`: a setter fired from an effect body
/// re-enters it while it is still on the stack.
pub(crate) type Body = Rc<dyn Fn(&Runtime) -> Result<()>>;

pub(crate) type Children = SmallVec<[ScopeId; 4]>;

/// One persistent state slot: the stored value plus its type name, kept for
/// mismatch errors and the state dump.
pub(crate) struct SlotEntry {
    value: Box<dyn Any>,
    type_name: &'static str,
}

impl SlotEntry {
    pub(crate) fn of<T: 'static>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: type_name::<T>(),
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// One function's persistent, call-ordered state and its position in the
/// scope tree.
///
/// Scopes live in the runtime's arena and are addressed by [`ScopeId`].
/// `parent` is a weak back-reference (the arena owns every scope); `children`
/// owns the subtrees created during the most recent invocation and is fully
/// rebuilt on every re-invocation.
pub(crate) struct Scope {
    slots: Vec<SlotEntry>,
    slot_cursor: usize,
    effects: Vec<Vec<Dep>>,
    effect_cursor: usize,
    body: Body,
    parent: Option<ScopeId>,
    children: Children,
    initialized: bool,
}

impl Scope {
    pub(crate) fn new(body: Body, parent: Option<ScopeId>) -> Self {
        Self {
            slots: Vec::new(),
            slot_cursor: 0,
            effects: Vec::new(),
            effect_cursor: 0,
            body,
            parent,
            children: Children::new(),
            initialized: false,
        }
    }

    pub(crate) fn body(&self) -> Body {
        Rc::clone(&self.body)
    }

    pub(crate) fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub(crate) fn adopt(&mut self, child: ScopeId) {
        self.children.push(child);
    }

    pub(crate) fn take_children(&mut self) -> Children {
        std::mem::take(&mut self.children)
    }

    pub(crate) fn children(&self) -> &[ScopeId] {
        &self.children
    }

    /// Pairs the next state declaration with its slot.
    ///
    /// A replay returns the stored value and ignores `initial`; the first
    /// invocation appends. Either way the cursor ends up one past the slot it
    /// returned, so append and replay trace the same trajectory.
    pub(crate) fn slot<T: Clone + 'static>(&mut self, initial: T) -> Result<(usize, T)> {
        let at = self.slot_cursor;
        if let Some(entry) = self.slots.get(at) {
            let value = entry.value.downcast_ref::<T>().cloned().ok_or(
                RuntimeError::SlotTypeMismatch {
                    slot: at,
                    stored: entry.type_name,
                    requested: type_name::<T>(),
                },
            )?;
            self.slot_cursor += 1;
            Ok((at, value))
        } else if self.initialized {
            Err(RuntimeError::SlotCountMismatch {
                recorded: self.slots.len(),
                declared: at + 1,
            })
        } else {
            self.slots.push(SlotEntry::of(initial.clone()));
            self.slot_cursor += 1;
            Ok((at, initial))
        }
    }

    /// Overwrites `index` and rewinds both cursors for the re-invocation.
    /// Out-of-range writes are refused; the runtime ignores them with a
    /// warning.
    pub(crate) fn store_slot(&mut self, index: usize, entry: SlotEntry) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                *slot = entry;
                self.slot_cursor = 0;
                self.effect_cursor = 0;
                true
            }
            None => false,
        }
    }

    pub(crate) fn effect_exists(&self) -> bool {
        self.effect_cursor < self.effects.len()
    }

    /// Pairs the next effect declaration with its recorded site. Only valid
    /// while [`Scope::effect_exists`] holds.
    pub(crate) fn consume_effect_site(&mut self) -> usize {
        let at = self.effect_cursor;
        self.effect_cursor += 1;
        at
    }

    pub(crate) fn effect_deps(&self, site: usize) -> &[Dep] {
        &self.effects[site]
    }

    /// Bounds-guarded overwrite of a site's stored dependency list.
    pub(crate) fn update_effect_site(&mut self, site: usize, deps: Vec<Dep>) {
        if let Some(stored) = self.effects.get_mut(site) {
            *stored = deps;
        }
    }

    /// Records a new effect site. Only reachable before the scope's first
    /// complete invocation; afterwards an unknown site is a count mismatch.
    pub(crate) fn create_effect_site(&mut self, deps: Vec<Dep>) {
        self.effects.push(deps);
        self.effect_cursor += 1;
    }

    pub(crate) fn effect_count(&self) -> usize {
        self.effects.len()
    }

    pub(crate) fn effect_cursor(&self) -> usize {
        self.effect_cursor
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// End-of-invocation bookkeeping: a replay must have consumed every
    /// recorded slot and effect site, and the first complete run arms those
    /// checks for all later ones.
    pub(crate) fn finish_invocation(&mut self) -> Result<()> {
        if self.initialized {
            if self.slot_cursor != self.slots.len() {
                return Err(RuntimeError::SlotCountMismatch {
                    recorded: self.slots.len(),
                    declared: self.slot_cursor,
                });
            }
            if self.effect_cursor != self.effects.len() {
                return Err(RuntimeError::EffectCountMismatch {
                    recorded: self.effects.len(),
                    declared: self.effect_cursor,
                });
            }
        } else {
            self.initialized = true;
        }
        Ok(())
    }

    pub(crate) fn slots(&self) -> &[SlotEntry] {
        &self.slots
    }

    pub(crate) fn effect_sites(&self) -> &[Vec<Dep>] {
        &self.effects
    }

    pub(crate) fn slot_cursor(&self) -> usize {
        self.slot_cursor
    }
}
