use core::fmt;

use crate::classify::{Exits, SlotInsn, SlotUse};

/// A register-form instruction with jump targets resolved to absolute
/// positions in the method's instruction sequence.
///
/// This is the instruction set the crate's tests and embedders without their
/// own bytecode use; the splitting pass itself only sees it through
/// [`SlotInsn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Load a constant into the accumulator.
    Const { value: i32 },
    /// Load a local slot into the accumulator.
    Load { slot: u16 },
    /// Store the accumulator into a local slot.
    Store { slot: u16 },
    /// Invoke something; falls through, may raise.
    Invoke { argc: u8 },
    /// Unconditional jump.
    Jump { target: usize },
    /// Conditional jump; falls through when the condition does not hold.
    Branch { target: usize },
    /// Multi-way dispatch over a default target and case targets.
    Switch { default: usize, cases: Vec<usize> },
    /// Return from the method.
    Return,
    /// Throw the accumulator.
    Throw,
}

impl SlotInsn for Instruction {
    fn slot_use(&self) -> Option<SlotUse> {
        match *self {
            Self::Load { slot } => Some(SlotUse::Read(slot)),
            Self::Store { slot } => Some(SlotUse::Write(slot)),
            _ => None,
        }
    }

    fn set_slot(&mut self, new: u16) {
        match self {
            Self::Load { slot } | Self::Store { slot } => *slot = new,
            _ => {}
        }
    }

    fn exits(&self) -> Exits<'_> {
        match self {
            Self::Jump { target } => Exits::Jump(*target),
            Self::Branch { target } => Exits::Branch(*target),
            Self::Switch { default, cases } => Exits::Switch {
                default: *default,
                cases,
            },
            Self::Return | Self::Throw => Exits::Terminal,
            _ => Exits::FallThrough,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const { value } => write!(f, "Const {value}"),
            Self::Load { slot } => write!(f, "Load v{slot}"),
            Self::Store { slot } => write!(f, "Store v{slot}"),
            Self::Invoke { argc } => write!(f, "Invoke {argc}"),
            Self::Jump { target } => write!(f, "Jump @{target}"),
            Self::Branch { target } => write!(f, "Branch @{target}"),
            Self::Switch { default, cases } => {
                write!(f, "Switch @{default}")?;
                for case in cases {
                    write!(f, " @{case}")?;
                }
                Ok(())
            }
            Self::Return => write!(f, "Return"),
            Self::Throw => write!(f, "Throw"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_use_classification() {
        assert_eq!(
            Instruction::Load { slot: 3 }.slot_use(),
            Some(SlotUse::Read(3))
        );
        assert_eq!(
            Instruction::Store { slot: 7 }.slot_use(),
            Some(SlotUse::Write(7))
        );
        assert_eq!(Instruction::Const { value: 1 }.slot_use(), None);
        assert_eq!(Instruction::Jump { target: 0 }.slot_use(), None);
    }

    #[test]
    fn set_slot_rewrites_operand() {
        let mut insn = Instruction::Store { slot: 2 };
        insn.set_slot(40_000);
        assert_eq!(insn, Instruction::Store { slot: 40_000 });

        let mut insn = Instruction::Return;
        insn.set_slot(5);
        assert_eq!(insn, Instruction::Return);
    }

    #[test]
    fn exits_classification() {
        assert_eq!(Instruction::Jump { target: 4 }.exits(), Exits::Jump(4));
        assert_eq!(Instruction::Branch { target: 9 }.exits(), Exits::Branch(9));
        assert_eq!(Instruction::Return.exits(), Exits::Terminal);
        assert_eq!(Instruction::Throw.exits(), Exits::Terminal);
        assert_eq!(Instruction::Invoke { argc: 0 }.exits(), Exits::FallThrough);

        let switch = Instruction::Switch {
            default: 1,
            cases: vec![2, 3],
        };
        assert_eq!(
            switch.exits(),
            Exits::Switch {
                default: 1,
                cases: &[2, 3]
            }
        );
    }

    #[test]
    fn display_instructions() {
        assert_eq!(Instruction::Load { slot: 2 }.to_string(), "Load v2");
        assert_eq!(Instruction::Jump { target: 12 }.to_string(), "Jump @12");
        assert_eq!(
            Instruction::Switch {
                default: 3,
                cases: vec![5, 8]
            }
            .to_string(),
            "Switch @3 @5 @8"
        );
    }
}
