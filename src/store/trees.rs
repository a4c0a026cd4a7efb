pub const JUDGEMENTS: &str = "judgements";
pub const SESSION_STATS: &str = "session_stats";
