use std::collections::HashMap;

use super::types::Type;

/// A binding's type plus whether it may be reassigned. Mirrors the
/// evaluator's `RuntimeEnv` one module over, but maps to types rather than
/// addresses.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub ty: Type,
    pub mutable: bool,
}

/// Layered name -> binding mapping. Lookup walks layers innermost first;
/// the outermost layer holds the built-ins and survives for the whole
/// session.
#[derive(Debug, Clone)]
pub struct TypeEnv {
    layers: Vec<HashMap<String, Binding>>,
}

impl TypeEnv {
    pub fn new() -> Self {
        Self {
            layers: vec![HashMap::new()],
        }
    }

    pub fn push_layer(&mut self) {
        self.layers.push(HashMap::new());
    }

    pub fn pop_layer(&mut self) {
        self.layers.pop();
    }

    pub fn define(&mut self, name: impl Into<String>, ty: Type, mutable: bool) {
        if let Some(layer) = self.layers.last_mut() {
            layer.insert(name.into(), Binding { ty, mutable });
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.layers
            .iter()
            .rev()
            .find_map(|layer| layer.get(name))
    }
}

impl Default for TypeEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_layer_shadows_outer() {
        let mut env = TypeEnv::new();
        env.define("x", Type::Int, false);

        env.push_layer();
        env.define("x", Type::Bool, false);
        assert_eq!(env.lookup("x").unwrap().ty, Type::Bool);

        env.pop_layer();
        assert_eq!(env.lookup("x").unwrap().ty, Type::Int);
    }

    #[test]
    fn missing_name_is_none() {
        let env = TypeEnv::new();
        assert!(env.lookup("nope").is_none());
    }
}
