use crate::classify::{Exits, SlotInsn};
use crate::method::Method;
use crate::split::SplitError;

/// Resolves the outgoing control-flow edges of every instruction.
///
/// Exception-region membership is precomputed once: for each protected
/// region, every instruction strictly inside it (start exclusive, end
/// exclusive) is tagged with the region's handler entry, modeling that
/// control may leave abnormally at that exact instruction. All jump,
/// switch, and region targets are validated during construction so the
/// sweep itself cannot encounter a dangling edge.
#[derive(Debug)]
pub(crate) struct FlowMap {
    len: usize,
    /// Exceptional successors per instruction position.
    handlers: Vec<Vec<usize>>,
}

impl FlowMap {
    pub(crate) fn build<I: SlotInsn>(method: &Method<I>) -> Result<Self, SplitError> {
        let len = method.insns.len();
        for (at, insn) in method.insns.iter().enumerate() {
            match insn.exits() {
                Exits::Jump(target) | Exits::Branch(target) => {
                    check_target(at, target, len)?;
                }
                Exits::Switch { default, cases } => {
                    check_target(at, default, len)?;
                    for &case in cases {
                        check_target(at, case, len)?;
                    }
                }
                Exits::FallThrough | Exits::Terminal => {}
            }
        }

        let mut handlers = vec![Vec::new(); len];
        for region in &method.try_regions {
            check_target(region.start, region.start, len)?;
            check_target(region.start, region.handler, len)?;
            if region.end > len {
                return Err(SplitError::MalformedControlFlow {
                    at: region.start,
                    target: region.end,
                });
            }
            for pos in region.start + 1..region.end {
                let entries = &mut handlers[pos];
                if !entries.contains(&region.handler) {
                    entries.push(region.handler);
                }
            }
        }

        Ok(Self { len, handlers })
    }

    /// Collect the successors of the instruction at `at` into `out`,
    /// normal edges first, then handler entries.
    pub(crate) fn successors_into<I: SlotInsn>(&self, at: usize, insn: &I, out: &mut Vec<usize>) {
        out.clear();
        match insn.exits() {
            Exits::Jump(target) => out.push(target),
            Exits::Branch(target) => {
                if at + 1 < self.len {
                    out.push(at + 1);
                }
                out.push(target);
            }
            Exits::Switch { default, cases } => {
                out.push(default);
                out.extend_from_slice(cases);
            }
            Exits::Terminal => {}
            Exits::FallThrough => {
                if at + 1 < self.len {
                    out.push(at + 1);
                }
                out.extend_from_slice(&self.handlers[at]);
            }
        }
    }
}

fn check_target(at: usize, target: usize, len: usize) -> Result<(), SplitError> {
    if target < len {
        Ok(())
    } else {
        Err(SplitError::MalformedControlFlow { at, target })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insn::Instruction;
    use crate::method::{Method, TryRegion};

    fn succs(flow: &FlowMap, at: usize, insn: &Instruction) -> Vec<usize> {
        let mut out = Vec::new();
        flow.successors_into(at, insn, &mut out);
        out
    }

    #[test]
    fn branch_has_fall_through_then_target() {
        let insns = vec![
            Instruction::Branch { target: 2 },
            Instruction::Const { value: 0 },
            Instruction::Return,
        ];
        let m = Method::new_static(vec![], insns);
        let flow = FlowMap::build(&m).unwrap();
        assert_eq!(succs(&flow, 0, &m.insns[0]), vec![1, 2]);
    }

    #[test]
    fn switch_has_default_then_cases() {
        let insns = vec![
            Instruction::Switch {
                default: 1,
                cases: vec![2, 3],
            },
            Instruction::Return,
            Instruction::Return,
            Instruction::Return,
        ];
        let m = Method::new_static(vec![], insns);
        let flow = FlowMap::build(&m).unwrap();
        assert_eq!(succs(&flow, 0, &m.insns[0]), vec![1, 2, 3]);
    }

    #[test]
    fn terminal_has_no_successors() {
        let m = Method::new_static(vec![], vec![Instruction::Return, Instruction::Throw]);
        let flow = FlowMap::build(&m).unwrap();
        assert_eq!(succs(&flow, 0, &m.insns[0]), Vec::<usize>::new());
        assert_eq!(succs(&flow, 1, &m.insns[1]), Vec::<usize>::new());
    }

    #[test]
    fn fall_through_past_end_is_no_successor() {
        let m = Method::new_static(vec![], vec![Instruction::Const { value: 0 }]);
        let flow = FlowMap::build(&m).unwrap();
        assert_eq!(succs(&flow, 0, &m.insns[0]), Vec::<usize>::new());
    }

    #[test]
    fn region_membership_is_strictly_inside() {
        let insns = vec![
            Instruction::Const { value: 0 }, // region start, not covered
            Instruction::Invoke { argc: 0 }, // covered
            Instruction::Invoke { argc: 0 }, // covered
            Instruction::Return,             // region end, not covered
            Instruction::Load { slot: 0 },   // handler
        ];
        let mut m = Method::new_static(vec![], insns);
        m.try_regions.push(TryRegion {
            start: 0,
            end: 3,
            handler: 4,
        });
        let flow = FlowMap::build(&m).unwrap();
        assert_eq!(succs(&flow, 0, &m.insns[0]), vec![1]);
        assert_eq!(succs(&flow, 1, &m.insns[1]), vec![2, 4]);
        assert_eq!(succs(&flow, 2, &m.insns[2]), vec![3, 4]);
        assert_eq!(succs(&flow, 3, &m.insns[3]), Vec::<usize>::new());
    }

    #[test]
    fn overlapping_regions_do_not_duplicate_handlers() {
        let insns = vec![
            Instruction::Const { value: 0 },
            Instruction::Invoke { argc: 0 },
            Instruction::Return,
            Instruction::Return, // handler
        ];
        let mut m = Method::new_static(vec![], insns);
        m.try_regions.push(TryRegion {
            start: 0,
            end: 2,
            handler: 3,
        });
        m.try_regions.push(TryRegion {
            start: 0,
            end: 2,
            handler: 3,
        });
        let flow = FlowMap::build(&m).unwrap();
        assert_eq!(succs(&flow, 1, &m.insns[1]), vec![2, 3]);
    }

    #[test]
    fn out_of_range_jump_is_rejected() {
        let m = Method::new_static(vec![], vec![Instruction::Jump { target: 9 }]);
        assert_eq!(
            FlowMap::build(&m).unwrap_err(),
            SplitError::MalformedControlFlow { at: 0, target: 9 }
        );
    }

    #[test]
    fn out_of_range_handler_is_rejected() {
        let mut m = Method::new_static(vec![], vec![Instruction::Return]);
        m.try_regions.push(TryRegion {
            start: 0,
            end: 1,
            handler: 7,
        });
        assert_eq!(
            FlowMap::build(&m).unwrap_err(),
            SplitError::MalformedControlFlow { at: 0, target: 7 }
        );
    }
}
