pub mod tool_call;
pub mod transcript;
pub mod turn;

pub use tool_call::ToolCall;
pub use transcript::Transcript;
pub use turn::{Role, Turn};
