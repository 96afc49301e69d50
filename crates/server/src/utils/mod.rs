mod github;
pub use github::{GithubClient, GithubConfig, GithubLookup};

mod shutdown_signal;
pub use shutdown_signal::shutdown_signal;

mod state;
pub use state::AppState;
