pub mod article;
pub mod detail;
pub mod document;
pub mod listing;
pub mod word_counter;

pub use article::{ArticleDetail, ArticleId, ArticleSummary, PageResult, PageToken, Paragraph, Section};
pub use detail::{ArticlePage, DetailView};
pub use listing::{AccumulatedListing, ListingSession, ListingState};
