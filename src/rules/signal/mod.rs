mod bot;
mod flag;
mod freshness;
mod suspect_score;

pub use bot::BotRule;
pub use flag::FlagRule;
pub use freshness::TimestampFreshnessRule;
pub use suspect_score::SuspectScoreRule;
