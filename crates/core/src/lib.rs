mod companion;
pub use companion::Companion;

pub mod facts;
pub use facts::{Extraction, FactKey, Facts, extract_facts, extract_name};

mod mood;
pub use mood::{Mood, classify_mood};

pub mod persistence;
pub use persistence::{JsonFileStore, MemoryPersistence, PersistError, SessionPersistence};

mod prompt;
pub use prompt::{Prompt, PromptBuilder};

mod session;
pub use session::{RECENT_HISTORY_LEN, Session};

mod store;
pub use store::{SessionGuard, SessionStore, StoreError};
