use smallvec::SmallVec;

use crate::ast::ExitDescriptor;

/// Exit descriptors of the values emitted code has left on the stack, in
/// stack order.
///
/// Each node pushes its descriptor after emitting itself; a parent pops its
/// operands' descriptors to decide whether they need unboxing. After a whole
/// tree is emitted, the single remaining entry describes the result.
#[derive(Debug, Default, Clone)]
pub struct CodeFlow {
    descriptors: SmallVec<[ExitDescriptor; 8]>,
}

impl CodeFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_descriptor(&mut self, descriptor: ExitDescriptor) {
        self.descriptors.push(descriptor);
    }

    pub fn pop_descriptor(&mut self) -> Option<ExitDescriptor> {
        self.descriptors.pop()
    }

    pub fn last_descriptor(&self) -> Option<ExitDescriptor> {
        self.descriptors.last().copied()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
