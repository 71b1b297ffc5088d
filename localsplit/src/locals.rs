use crate::split::SplitError;

/// First slot number handed out to synthetic identities. Original slot
/// operands never reach this range, so synthetic slots cannot collide with
/// them.
pub(crate) const SYNTHETIC_BASE: u32 = i16::MAX as u32;

/// Handle to a local-variable identity in a [`Locals`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct LocalId(u32);

#[derive(Debug)]
struct Entry {
    /// Union-find parent; an entry is a representative when it is its own
    /// parent.
    parent: u32,
    slot: u16,
    /// Fixed identities (receiver, parameters) keep their slot number and
    /// win any unification.
    fixed: bool,
}

/// Arena of local-variable identities with union-find reconciliation.
///
/// Identities reaching the same merge point for the same original slot are
/// unified rather than mutated through shared references: every holder of a
/// [`LocalId`] observes a unification by resolving through
/// [`find`](Self::find). Scoped to a single method transformation; the
/// synthetic slot counter starts fresh per instance.
#[derive(Debug)]
pub(crate) struct Locals {
    entries: Vec<Entry>,
    next_synthetic: u32,
}

impl Locals {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_synthetic: SYNTHETIC_BASE,
        }
    }

    /// A fixed identity for a receiver or parameter slot.
    pub(crate) fn fixed(&mut self, slot: u16) -> LocalId {
        self.push(slot, true)
    }

    /// A fresh synthetic identity for a write site.
    pub(crate) fn fresh(&mut self) -> Result<LocalId, SplitError> {
        if self.next_synthetic > u16::MAX as u32 {
            return Err(SplitError::SyntheticSlotsExhausted);
        }
        let slot = self.next_synthetic as u16;
        self.next_synthetic += 1;
        Ok(self.push(slot, false))
    }

    fn push(&mut self, slot: u16, fixed: bool) -> LocalId {
        let id = self.entries.len() as u32;
        self.entries.push(Entry {
            parent: id,
            slot,
            fixed,
        });
        LocalId(id)
    }

    /// Representative of `id`, with path compression.
    pub(crate) fn find(&mut self, id: LocalId) -> LocalId {
        let mut root = id.0;
        while self.entries[root as usize].parent != root {
            root = self.entries[root as usize].parent;
        }
        let mut cur = id.0;
        while cur != root {
            let next = self.entries[cur as usize].parent;
            self.entries[cur as usize].parent = root;
            cur = next;
        }
        LocalId(root)
    }

    /// Reconcile two identities reaching the same program point for the
    /// same original slot. A fixed incoming identity wins; otherwise the
    /// incoming identity adopts the existing one (which also lets an
    /// existing fixed identity win).
    pub(crate) fn unify(&mut self, incoming: LocalId, existing: LocalId) {
        let a = self.find(incoming);
        let b = self.find(existing);
        if a == b {
            return;
        }
        if self.entries[a.0 as usize].fixed {
            self.entries[b.0 as usize].parent = a.0;
        } else {
            self.entries[a.0 as usize].parent = b.0;
        }
    }

    /// Final slot number of the identity's representative.
    pub(crate) fn slot_of(&mut self, id: LocalId) -> u16 {
        let root = self.find(id);
        self.entries[root.0 as usize].slot
    }

    /// Synthetic identities handed out so far.
    pub(crate) fn synthetic_count(&self) -> u32 {
        self.next_synthetic - SYNTHETIC_BASE
    }
}
