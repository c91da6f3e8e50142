use std::collections::HashMap;

use super::store::Address;

/// Layered name -> address mapping, grounded on the same push/pop/find/set
/// shape the tree-walking evaluator has always used here, generalized to
/// store addresses instead of values directly — the indirection through
/// [`super::store::Store`] is what lets closures see mutations made after
/// they were created.
#[derive(Debug, Clone, Default)]
pub struct RuntimeEnv {
    scope_stack: Vec<HashMap<String, Address>>,
}

impl RuntimeEnv {
    pub fn new() -> Self {
        Self {
            scope_stack: vec![HashMap::new()],
        }
    }

    /// Find an address by walking scopes from the innermost outward.
    pub fn find(&self, name: &str) -> Option<Address> {
        self.scope_stack
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    pub fn push(&mut self) {
        self.scope_stack.push(HashMap::new());
    }

    pub fn pop(&mut self) {
        self.scope_stack.pop();
    }

    /// Bind a name to an address in the current (innermost) scope.
    pub fn set(&mut self, name: impl Into<String>, address: Address) {
        if let Some(scope) = self.scope_stack.last_mut() {
            scope.insert(name.into(), address);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_scope_shadows_outer() {
        let mut env = RuntimeEnv::new();
        env.set("x", 0);

        env.push();
        env.set("x", 1);
        assert_eq!(env.find("x"), Some(1));

        env.pop();
        assert_eq!(env.find("x"), Some(0));
    }
}
