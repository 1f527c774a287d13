pub mod prompt;
pub mod progress;

pub use prompt::ConfirmPrompt;
pub use progress::{create_spinner, hidden_spinner};
