#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Install the function and map reference handlers on the intrinsic prototypes.
    pub install_builtins: bool,
    /// Limit on handlers dispatching through further abstract references.
    pub max_dispatch_depth: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            install_builtins: true,
            max_dispatch_depth: 1000,
        }
    }
}

impl EngineConfig {
    pub fn with_builtins(mut self, install_builtins: bool) -> Self {
        self.install_builtins = install_builtins;
        self
    }

    pub fn with_max_dispatch_depth(mut self, max_dispatch_depth: u32) -> Self {
        self.max_dispatch_depth = max_dispatch_depth;
        self
    }
}
