use thiserror::Error;

/// Errors raised synchronously by the runtime's accessors.
///
/// There is no rollback: slots and effect records already mutated earlier in
/// the failing invocation stay as written, and the error travels out of the
/// re-invocation to whoever called the setter or mounted the scope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// A state, effect, or nested scope declaration ran outside any live
    /// scope body.
    #[error("no active scope: declarations require a live scope body")]
    NoActiveScope,

    /// A second top-level scope was mounted on a runtime that already has a
    /// root. An independent root belongs on its own `Runtime`.
    #[error("a root scope is already mounted on this runtime")]
    RootAlreadyMounted,

    /// A replayed slot holds a value of a different type than the one read
    /// back, i.e. the body's declaration order changed.
    #[error("state slot {slot} holds `{stored}` but was read as `{requested}`")]
    SlotTypeMismatch {
        slot: usize,
        stored: &'static str,
        requested: &'static str,
    },

    /// The number of state declarations changed between invocations.
    #[error("state slot count changed across invocations ({recorded} recorded, {declared} declared)")]
    SlotCountMismatch { recorded: usize, declared: usize },

    /// The number of effect sites changed between invocations.
    #[error("effect count changed across invocations ({recorded} recorded, {declared} declared)")]
    EffectCountMismatch { recorded: usize, declared: usize },

    /// A dependency list changed length at the same call-order site.
    #[error("effect site {site}: dependency list length changed ({recorded} -> {declared})")]
    EffectArityMismatch {
        site: usize,
        recorded: usize,
        declared: usize,
    },
}

pub type Result<T, E = RuntimeError> = std::result::Result<T, E>;
