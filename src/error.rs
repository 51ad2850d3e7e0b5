use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynergyError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("match {match_id}: team {team_id} has both winning and losing participants")]
    InconsistentTeamOutcome { match_id: String, team_id: i64 },
}

pub type Result<T> = std::result::Result<T, SynergyError>;
