//! Governance Client (Snapshot hub GraphQL)
//!
//! Looks up the space `<symbol>.eth` and its most recent proposals. A space
//! that does not exist is `Ok(None)`; a space with no proposals is a real
//! (and risky) snapshot.

use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use crate::models::errors::{AppError, AppResult};
use crate::models::types::GovernanceSnapshot;
use crate::providers::build_http_client;
use crate::utils::constants::GOVERNANCE_PROPOSAL_WINDOW;

const PROPOSALS_QUERY: &str = r#"
query Governance($space: String!, $first: Int!) {
  space(id: $space) { id }
  proposals(
    first: $first,
    where: { space: $space },
    orderBy: "created",
    orderDirection: desc
  ) {
    id
    state
    votes
  }
}
"#;

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse {
    pub data: Option<GovernanceData>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct GovernanceData {
    pub space: Option<SpaceRef>,
    #[serde(default)]
    pub proposals: Option<Vec<Proposal>>,
}

#[derive(Debug, Deserialize)]
pub struct SpaceRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct Proposal {
    pub id: String,
    pub state: Option<String>,
    pub votes: Option<u64>,
}

#[derive(Clone)]
pub struct GovernanceClient {
    client: reqwest::Client,
    endpoint: String,
}

impl GovernanceClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            endpoint: endpoint.into(),
        })
    }

    /// Governance activity for the token `symbol`
    pub async fn get_governance(&self, symbol: &str) -> AppResult<Option<GovernanceSnapshot>> {
        let Some(space) = space_for_symbol(symbol) else {
            return Ok(None);
        };
        info!("🗳️ Governance: querying space {}", space);

        let body = json!({
            "query": PROPOSALS_QUERY,
            "variables": { "space": space, "first": GOVERNANCE_PROPOSAL_WINDOW },
        });

        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(AppError::governance_error(format!(
                "Governance HTTP error: {}",
                response.status()
            )));
        }

        let parsed: GraphQlResponse = response.json().await?;
        let snapshot = summarize_governance(&space, parsed)?;
        debug!("Governance for {}: {:?}", space, snapshot);
        Ok(snapshot)
    }
}

/// `"AAVE"` → `"aave.eth"`; symbols with anything but ASCII alphanumerics
/// cannot name a space
pub fn space_for_symbol(symbol: &str) -> Option<String> {
    let symbol = symbol.trim();
    if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(format!("{}.eth", symbol.to_lowercase()))
}

pub fn summarize_governance(
    space: &str,
    response: GraphQlResponse,
) -> AppResult<Option<GovernanceSnapshot>> {
    if let Some(err) = response.errors.first() {
        return Err(AppError::governance_error(format!(
            "Governance query failed: {}",
            err.message
        )));
    }

    let Some(data) = response.data else {
        return Err(AppError::governance_error("Governance response has no data"));
    };
    if data.space.is_none() {
        return Ok(None);
    }

    let proposals = data.proposals.unwrap_or_default();
    let active = proposals
        .iter()
        .filter(|p| p.state.as_deref() == Some("active"))
        .count();
    let average_votes = if proposals.is_empty() {
        0.0
    } else {
        proposals.iter().map(|p| p.votes.unwrap_or(0) as f64).sum::<f64>() / proposals.len() as f64
    };

    Ok(Some(GovernanceSnapshot {
        space: space.to_string(),
        proposal_count: proposals.len(),
        active_proposals: active,
        average_votes,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: serde_json::Value) -> GraphQlResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_space_for_symbol() {
        assert_eq!(space_for_symbol("AAVE").as_deref(), Some("aave.eth"));
        assert_eq!(space_for_symbol(" uni ").as_deref(), Some("uni.eth"));
        assert!(space_for_symbol("").is_none());
        assert!(space_for_symbol("USD.e").is_none());
    }

    #[test]
    fn test_summarize_proposals() {
        let response = parse(json!({
            "data": {
                "space": {"id": "aave.eth"},
                "proposals": [
                    {"id": "0x1", "state": "active", "votes": 300},
                    {"id": "0x2", "state": "closed", "votes": 100},
                    {"id": "0x3", "state": "closed", "votes": null}
                ]
            }
        }));
        let snapshot = summarize_governance("aave.eth", response).unwrap().unwrap();
        assert_eq!(snapshot.proposal_count, 3);
        assert_eq!(snapshot.active_proposals, 1);
        assert!((snapshot.average_votes - 400.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_space() {
        let response = parse(json!({"data": {"space": null, "proposals": []}}));
        assert!(summarize_governance("nope.eth", response).unwrap().is_none());
    }

    #[test]
    fn test_graphql_error() {
        let response = parse(json!({"errors": [{"message": "rate limited"}]}));
        assert!(summarize_governance("aave.eth", response).is_err());
    }
}
