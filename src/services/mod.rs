//! Services layer
//!
//! Features built on top of the store:
//! - Discovery search over the catalogue or AI suggestions
//! - The assistant chat session
//! - Side-by-side comparison

pub mod assistant;
pub mod compare;
pub mod discover;
pub mod mock_data;

pub use assistant::{AssistantSession, LanguageSuggestion};
pub use compare::{AddOutcome, CompareService, Highlights, MAX_COMPARED};
pub use discover::{DiscoveryService, ResultSource, SearchCriteria, SearchOutcome};
pub use mock_data::mock_influencers;
