mod classify;
mod flow;
mod insn;
mod locals;
mod method;
mod split;

pub use classify::{Exits, SlotInsn, SlotUse};
pub use insn::Instruction;
pub use method::{Label, Method, MethodBuilder, ParamWidth, TryRegion};
pub use split::{LocalSplit, MethodTransformer, SplitError, split_locals};
