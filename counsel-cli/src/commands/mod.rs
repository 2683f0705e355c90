pub mod render;
pub mod results;
pub mod submit;
pub mod watch;

pub use render::{handle_render_command, RenderArgs};
pub use results::{handle_results_command, ResultsArgs};
pub use submit::{handle_submit_command, SubmitArgs};
pub use watch::{handle_watch_command, WatchArgs};
