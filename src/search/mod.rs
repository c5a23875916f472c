//! Incremental search over navigation objects and indexed page members.
//!
//! Object entries come straight from the navigation tree. Method and property
//! entries are added by the background indexer as pages are fetched, so the
//! result set for an active query grows while indexing runs.

pub mod entry;
pub mod extract;
pub mod query;
pub mod registry;
pub mod scoring;
pub mod session;
pub mod state;

pub use entry::{EntryKind, EntryMeta, SearchEntry, build_search_entry};
pub use extract::{ContentKind, HeadingClassifier, PageIndex, SectionClassifier, SectionHeading, extract_page_index};
pub use query::{SearchStatus, perform_search};
pub use registry::{EntryRegistry, Pool};
pub use scoring::evaluate_match;
pub use session::{SearchSession, SearchView};
pub use state::SearchState;
