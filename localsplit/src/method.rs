use crate::insn::Instruction;

/// Slot width of a declared parameter.
///
/// Double-width parameters (`long`/`double`-like values) occupy two
/// consecutive slots but are only ever addressed through the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamWidth {
    Single,
    Double,
}

impl ParamWidth {
    /// Number of slots the parameter occupies.
    pub fn slots(self) -> u16 {
        match self {
            Self::Single => 1,
            Self::Double => 2,
        }
    }
}

/// A protected instruction range with its handler entry.
///
/// `start` is exclusive and `end` is exclusive: an exceptional transfer to
/// `handler` can occur at any instruction strictly between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TryRegion {
    pub start: usize,
    pub end: usize,
    pub handler: usize,
}

/// A method body: an ordered instruction sequence plus the metadata the
/// splitting pass needs (receiver flag, parameter widths, protected
/// regions).
#[derive(Debug, Clone)]
pub struct Method<I> {
    pub insns: Vec<I>,
    pub is_static: bool,
    pub params: Vec<ParamWidth>,
    pub try_regions: Vec<TryRegion>,
}

impl<I> Method<I> {
    pub fn new_static(params: Vec<ParamWidth>, insns: Vec<I>) -> Self {
        Self {
            insns,
            is_static: true,
            params,
            try_regions: Vec::new(),
        }
    }

    pub fn new_instance(params: Vec<ParamWidth>, insns: Vec<I>) -> Self {
        Self {
            insns,
            is_static: false,
            params,
            try_regions: Vec::new(),
        }
    }

    /// The slots that hold incoming values on entry: the receiver (slot 0,
    /// instance methods only) followed by one slot per declared parameter,
    /// advancing by two after a double-width parameter.
    pub fn param_slots(&self) -> Vec<u16> {
        let mut slots = Vec::with_capacity(self.params.len() + 1);
        let mut next = 0u16;
        if !self.is_static {
            slots.push(next);
            next += 1;
        }
        for param in &self.params {
            slots.push(next);
            next += param.slots();
        }
        slots
    }
}

/// A forward jump whose target has not yet been resolved.
///
/// Created by [`MethodBuilder::jump`] and [`MethodBuilder::branch`];
/// resolve it with [`MethodBuilder::bind`]. An unbound label leaves an
/// out-of-range target behind, which the splitting pass rejects as
/// malformed control flow.
#[derive(Debug)]
pub struct Label {
    at: usize,
}

/// Builds an instruction sequence with forward-referencing jump targets.
#[derive(Debug, Default)]
pub struct MethodBuilder {
    insns: Vec<Instruction>,
}

impl MethodBuilder {
    pub fn new() -> Self {
        Self { insns: Vec::new() }
    }

    /// Position the next emitted instruction will occupy.
    pub fn here(&self) -> usize {
        self.insns.len()
    }

    pub fn const_(&mut self, value: i32) {
        self.insns.push(Instruction::Const { value });
    }

    pub fn load(&mut self, slot: u16) {
        self.insns.push(Instruction::Load { slot });
    }

    pub fn store(&mut self, slot: u16) {
        self.insns.push(Instruction::Store { slot });
    }

    pub fn invoke(&mut self, argc: u8) {
        self.insns.push(Instruction::Invoke { argc });
    }

    /// Emit an unconditional forward jump. Returns a [`Label`] to
    /// [`bind`](Self::bind) later.
    pub fn jump(&mut self) -> Label {
        let at = self.insns.len();
        self.insns.push(Instruction::Jump { target: usize::MAX });
        Label { at }
    }

    /// Emit a conditional forward jump. Returns a [`Label`] to
    /// [`bind`](Self::bind) later.
    pub fn branch(&mut self) -> Label {
        let at = self.insns.len();
        self.insns.push(Instruction::Branch { target: usize::MAX });
        Label { at }
    }

    /// Emit an unconditional jump to a known position (obtained from
    /// [`here`](Self::here)).
    pub fn jump_to(&mut self, target: usize) {
        self.insns.push(Instruction::Jump { target });
    }

    /// Emit a conditional jump to a known position.
    pub fn branch_to(&mut self, target: usize) {
        self.insns.push(Instruction::Branch { target });
    }

    pub fn switch(&mut self, default: usize, cases: Vec<usize>) {
        self.insns.push(Instruction::Switch { default, cases });
    }

    pub fn return_(&mut self) {
        self.insns.push(Instruction::Return);
    }

    pub fn throw(&mut self) {
        self.insns.push(Instruction::Throw);
    }

    /// Bind a forward jump label to the current position.
    pub fn bind(&mut self, label: Label) {
        let target = self.insns.len();
        match &mut self.insns[label.at] {
            Instruction::Jump { target: t } | Instruction::Branch { target: t } => *t = target,
            _ => {}
        }
    }

    pub fn into_insns(self) -> Vec<Instruction> {
        self.insns
    }
}
