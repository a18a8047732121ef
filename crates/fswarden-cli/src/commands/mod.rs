/// Command implementations.
pub mod report;
pub mod walk;

/// Settings shared by every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct Context {
    pub verbose: bool,
}
