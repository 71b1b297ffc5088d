use std::collections::hash_map::Entry;
use std::fmt;

use log::{debug, trace};
use rustc_hash::FxHashMap;

use crate::classify::{SlotInsn, SlotUse};
use crate::flow::FlowMap;
use crate::locals::{LocalId, Locals};
use crate::method::Method;

/// Fatal conditions that abort the transformation of a method.
///
/// No condition is retried; a failed method is left untouched (the rewrite
/// is the last step) and other methods are unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitError {
    /// A jump, switch, or exception-region target lies outside the
    /// instruction sequence.
    MalformedControlFlow { at: usize, target: usize },
    /// A read instruction's slot has no binding in its reaching frame
    /// (read-before-write per this analysis).
    UnboundSlotRead { at: usize, slot: u16 },
    /// The method has more distinct write sites than addressable synthetic
    /// slots.
    SyntheticSlotsExhausted,
}

impl fmt::Display for SplitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedControlFlow { at, target } => {
                write!(
                    f,
                    "control-flow target {target} at instruction {at} is out of range"
                )
            }
            Self::UnboundSlotRead { at, slot } => {
                write!(f, "instruction {at} reads slot v{slot} before any write")
            }
            Self::SyntheticSlotsExhausted => {
                write!(f, "synthetic slot space exhausted")
            }
        }
    }
}

impl std::error::Error for SplitError {}

/// A method pass that rewrites a body in place.
///
/// The seam the enclosing toolchain chains passes through;
/// [`LocalSplit`] is this crate's only implementation.
pub trait MethodTransformer<I: SlotInsn> {
    fn transform(&self, method: &mut Method<I>) -> Result<(), SplitError>;
}

/// The live-range splitting pass, as a chainable [`MethodTransformer`].
#[derive(Debug, Default)]
pub struct LocalSplit;

impl<I: SlotInsn> MethodTransformer<I> for LocalSplit {
    fn transform(&self, method: &mut Method<I>) -> Result<(), SplitError> {
        split_locals(method)
    }
}

/// The reaching frame at one instruction: original slot to current identity.
type Frame = FxHashMap<u16, LocalId>;

/// Split the disjoint lifetimes of every reused local slot onto distinct
/// slots, in place.
///
/// A single forward sweep in program order builds a reaching frame per
/// instruction, mints a fresh synthetic identity at every write site, and
/// unifies identities that meet at control-flow joins (including exceptional
/// edges into handlers). Receiver and parameter slots are fixed and never
/// renumbered. A back-edge merges into its target's frame exactly once; the
/// sweep does not iterate to a fixed point.
pub fn split_locals<I: SlotInsn>(method: &mut Method<I>) -> Result<(), SplitError> {
    let len = method.insns.len();
    if len == 0 {
        return Ok(());
    }
    let flow = FlowMap::build(method)?;

    let mut locals = Locals::new();
    let mut frames: Vec<Frame> = vec![Frame::default(); len];
    let mut defined = vec![false; len];
    for slot in method.param_slots() {
        let id = locals.fixed(slot);
        frames[0].insert(slot, id);
    }
    defined[0] = true;

    // The identity observed at each read/write site, resolved after the
    // sweep settles.
    let mut captures: Vec<Option<LocalId>> = vec![None; len];
    let mut succ: Vec<usize> = Vec::new();

    for at in 0..len {
        defined[at] = true;
        flow.successors_into(at, &method.insns[at], &mut succ);

        let out = match method.insns[at].slot_use() {
            Some(SlotUse::Write(slot)) => {
                let mut out = frames[at].clone();
                let fresh = locals.fresh()?;
                trace!(
                    "{at}: write v{slot} starts lifetime v{}",
                    locals.slot_of(fresh)
                );
                out.insert(slot, fresh);
                captures[at] = Some(fresh);
                out
            }
            Some(SlotUse::Read(slot)) => {
                let id = frames[at]
                    .get(&slot)
                    .copied()
                    .ok_or(SplitError::UnboundSlotRead { at, slot })?;
                captures[at] = Some(id);
                frames[at].clone()
            }
            None => frames[at].clone(),
        };

        for &target in &succ {
            merge_into(
                &mut frames[target],
                &mut defined[target],
                &out,
                &mut locals,
            );
        }
    }

    let mut rewritten = 0usize;
    for (at, capture) in captures.iter().enumerate() {
        if let Some(id) = *capture {
            let slot = locals.slot_of(id);
            method.insns[at].set_slot(slot);
            rewritten += 1;
        }
    }
    debug!(
        "rewrote {rewritten} slot accesses, {} synthetic lifetimes",
        locals.synthetic_count()
    );
    Ok(())
}

/// Merge a propagated frame into a successor's frame: install a copy if the
/// successor was unreached, otherwise add missing bindings and unify
/// conflicting ones.
fn merge_into(dest: &mut Frame, defined: &mut bool, out: &Frame, locals: &mut Locals) {
    if !*defined {
        *defined = true;
        dest.clone_from(out);
        return;
    }
    for (&slot, &incoming) in out {
        match dest.entry(slot) {
            Entry::Vacant(e) => {
                e.insert(incoming);
            }
            Entry::Occupied(e) => {
                let existing = *e.get();
                if locals.find(incoming) != locals.find(existing) {
                    trace!(
                        "unify v{slot}: v{} adopts v{}",
                        locals.slot_of(incoming),
                        locals.slot_of(existing)
                    );
                    locals.unify(incoming, existing);
                }
            }
        }
    }
}
