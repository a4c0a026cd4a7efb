/// Judgement key: `{session_id}:{sequence:020}`. Zero padding keeps lexical
/// order equal to append order within a session.
pub fn judgement_key(session_id: &str, sequence: u64) -> String {
    format!("{}:{:020}", session_id, sequence)
}

pub fn judgement_prefix(session_id: &str) -> String {
    format!("{}:", session_id)
}

pub fn session_stats_key(session_id: &str) -> String {
    session_id.to_string()
}
