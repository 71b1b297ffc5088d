/// How an instruction touches local storage, if at all.
///
/// The slot is the operand's original slot index as it appears in the
/// undecoded method body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotUse {
    /// The instruction reads the slot and leaves it unchanged.
    Read(u16),
    /// The instruction overwrites the slot, starting a new lifetime.
    Write(u16),
}

/// Where control can go after an instruction.
///
/// Targets are absolute positions in the method's instruction sequence.
/// Exceptional edges (handler entries) are not part of this classification;
/// they are derived from the method's protected regions by the successor
/// resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exits<'a> {
    /// Falls through to the next instruction.
    FallThrough,
    /// Unconditional transfer to a single target.
    Jump(usize),
    /// Conditional transfer: falls through or goes to the target.
    Branch(usize),
    /// Multi-way dispatch over a default target and case targets.
    Switch { default: usize, cases: &'a [usize] },
    /// No successor (return, throw, unreachable end).
    Terminal,
}

/// Classification capability an instruction set must provide for the
/// splitting pass.
///
/// The pass never inspects opcodes; everything it needs to know about an
/// instruction comes through this trait, which keeps it independent of any
/// particular bytecode encoding.
pub trait SlotInsn {
    /// The slot access performed by this instruction, or `None` for
    /// instructions that do not touch local storage.
    fn slot_use(&self) -> Option<SlotUse>;

    /// Rewrite the slot operand in place. Only called on instructions that
    /// reported a [`SlotUse`]; a no-op elsewhere.
    fn set_slot(&mut self, slot: u16);

    /// The normal (non-exceptional) control-flow exits.
    fn exits(&self) -> Exits<'_>;
}
