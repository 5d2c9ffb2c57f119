pub mod shell;

pub use shell::{render_message, run_shell};
