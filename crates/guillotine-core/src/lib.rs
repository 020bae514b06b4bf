// Guillotine league analytics: elimination replay, chop-line rankings,
// FAAB accounting, weekly statistics and season reports, computed from a
// frozen per-season snapshot.

pub mod budget;
pub mod career;
pub mod death_bell;
pub mod elimination;
pub mod error;
pub mod historical;
pub mod model;
pub mod names;
pub mod ranking;
pub mod recap;
pub mod season;
pub mod transactions;
pub mod upstream;
pub mod weekly_stats;

pub use error::CoreError;
pub use model::{SeasonSettings, SeasonSnapshot};
pub use season::{process_season, SeasonReport};
