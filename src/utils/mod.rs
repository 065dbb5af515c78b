mod backend;
mod profiles;
mod prompts;
mod session;
mod settings;
mod theme;
mod types;

pub use backend::{BackendClient, BackendProfile, CancelFlag, StreamEvent, DEFAULT_TIMEOUT_SECS};
pub use profiles::{ProfileEntry, ProfileStore, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use prompts::{PromptLibrary, PromptTemplate};
pub use session::{
    append_marker, compose_prompt, format_elapsed, reconcile_selection, required_inputs,
    run_banner, validate_inputs, RequiredInputs, ThinkRewriter, CANCELLED_MARKER, FINISHED_MARKER,
    INPUT1_MARKER, INPUT2_MARKER,
};
pub use settings::{Settings, ThemeMode, DEFAULT_MAX_INPUT_CHARS};
pub use theme::Theme;
pub use types::AppView;
