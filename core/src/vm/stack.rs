use alloc::vec::Vec;
use core::fmt;

/// Operand stack with a fixed maximum size.
///
/// Compiled code records the exact depth it needs, so well-formed code never
/// hits the limit. Bytecode loaded from elsewhere may lie about it, which is
/// why pushing is fallible rather than asserted.
pub struct Stack<T> {
    items: Vec<T>,
    max_size: usize,
}

impl<T> Stack<T> {
    pub fn new(max_size: usize) -> Self {
        // Pre-allocate a reasonable amount to avoid reallocations
        let initial_capacity = max_size.min(256);

        Self {
            items: Vec::with_capacity(initial_capacity),
            max_size,
        }
    }

    /// Pushes a value, handing it back if the stack is full.
    #[inline]
    pub fn push(&mut self, value: T) -> Result<(), T> {
        if self.items.len() >= self.max_size {
            return Err(value);
        }
        self.items.push(value);
        Ok(())
    }

    /// Removes and returns the top value, or `None` if the stack is empty.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of values the stack accepts.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_size
    }
}

impl<T: fmt::Debug> fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack")
            .field("items", &self.items)
            .field("len", &self.items.len())
            .field("capacity", &self.max_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stack() {
        let stack: Stack<i32> = Stack::new(100);
        assert_eq!(stack.len(), 0);
        assert_eq!(stack.capacity(), 100);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_push_pop() {
        let mut stack = Stack::new(100);
        stack.push(1).unwrap();
        stack.push(2).unwrap();
        stack.push(3).unwrap();

        assert_eq!(stack.len(), 3);
        assert_eq!(stack.pop(), Some(3));
        assert_eq!(stack.pop(), Some(2));
        assert_eq!(stack.pop(), Some(1));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn test_full_stack_rejects_push() {
        let mut stack = Stack::new(2);
        stack.push(1).unwrap();
        stack.push(2).unwrap();
        assert_eq!(stack.push(3), Err(3));
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn test_zero_capacity() {
        let mut stack: Stack<u8> = Stack::new(0);
        assert_eq!(stack.push(1), Err(1));
    }
}
