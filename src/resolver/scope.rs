use std::collections::HashMap;

/// Stack of lexical scopes mapping source names to their unique renames.
///
/// One scope is pushed per compound statement and popped on exit; the
/// bottom scope is the function body. Lookups search innermost-out.
#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<HashMap<String, String>>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    pub fn push(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop(&mut self) {
        self.scopes.pop();
    }

    /// Whether `name` is declared in the innermost scope. Declarations in
    /// outer scopes do not count; shadowing them is legal.
    pub fn declared_in_innermost(&self, name: &str) -> bool {
        self.scopes
            .last()
            .is_some_and(|scope| scope.contains_key(name))
    }

    /// Resolve `name` to its unique rename, searching scopes innermost-out.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .map(String::as_str)
    }

    pub fn insert(&mut self, name: String, unique: String) {
        self.scopes
            .last_mut()
            .expect("the scope stack always holds the function scope")
            .insert(name, unique);
    }
}
