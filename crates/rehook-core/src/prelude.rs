pub use crate::deps;
pub use crate::effects::Dep;
pub use crate::error::{Result, RuntimeError};
pub use crate::runtime::Runtime;
pub use crate::scope::ScopeId;
pub use crate::state::SetState;
