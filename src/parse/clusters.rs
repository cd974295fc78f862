//! Cluster list parsing.
//!
//! Input is a `;`-separated list of clusters, each a `,`-separated list of
//! ids. Block fields additionally accept inclusive ranges `a-b` in either
//! order. Whitespace around tokens is ignored and empty clusters are
//! skipped. Clusters are numbered from 1 in the order they appear.

use crate::error::ValidationIssue;
use crate::model::{ConstraintKind, IndividualId};
use std::collections::HashSet;
use tracing::debug;

/// Widest range a single `a-b` token may expand to.
pub const MAX_RANGE_SPAN: u32 = 10_000;

/// Clusters accepted from one input field plus the problems found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedClusters {
    pub clusters: Vec<Vec<IndividualId>>,
    pub issues: Vec<ValidationIssue>,
}

impl ParsedClusters {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Parses a field for the given constraint kind.
///
/// Gender balance carries no payload and always yields an empty result.
///
/// # Examples
///
/// ```
/// use u_grouping::model::ConstraintKind;
/// use u_grouping::parse::parse_clusters;
///
/// let parsed = parse_clusters("1-3, 5; 9,8", ConstraintKind::BlockDistribution);
/// assert_eq!(parsed.clusters, vec![vec![1, 2, 3, 5], vec![8, 9]]);
///
/// let parsed = parse_clusters("1,1,2; 3,4", ConstraintKind::CoLocation);
/// assert_eq!(parsed.clusters, vec![vec![3, 4]]);
/// assert_eq!(parsed.issues.len(), 1);
/// ```
pub fn parse_clusters(input: &str, kind: ConstraintKind) -> ParsedClusters {
    match kind {
        ConstraintKind::BlockDistribution => parse_blocks(input),
        ConstraintKind::CoLocation | ConstraintKind::Separation => parse_pairings(input, kind),
        ConstraintKind::GenderBalance => ParsedClusters::default(),
    }
}

/// Blocks: ranges allowed, ids sorted and deduplicated. An id already
/// claimed by an earlier block is dropped from later ones.
fn parse_blocks(input: &str) -> ParsedClusters {
    let kind = ConstraintKind::BlockDistribution;
    let mut parsed = ParsedClusters::default();
    let mut claimed: HashSet<IndividualId> = HashSet::new();

    'blocks: for (cluster, tokens) in split_clusters(input) {
        let mut ids: Vec<IndividualId> = Vec::new();
        for token in tokens {
            if token.contains('-') {
                match parse_range(token) {
                    Some((lo, hi)) => ids.extend(lo..=hi),
                    None => {
                        parsed.issues.push(malformed(kind, cluster, token));
                        continue 'blocks;
                    }
                }
            } else {
                match parse_id(token) {
                    Some(id) => ids.push(id),
                    None => {
                        parsed.issues.push(malformed(kind, cluster, token));
                        continue 'blocks;
                    }
                }
            }
        }

        ids.sort_unstable();
        ids.dedup();
        let before = ids.len();
        ids.retain(|id| claimed.insert(*id));
        if ids.len() < before {
            debug!(
                cluster,
                dropped = before - ids.len(),
                "ids already claimed by an earlier block"
            );
        }
        if !ids.is_empty() {
            parsed.clusters.push(ids);
        }
    }

    parsed
}

/// Co-location and separation: plain ids only, input order kept, at least
/// two distinct ids, no repeats.
fn parse_pairings(input: &str, kind: ConstraintKind) -> ParsedClusters {
    let mut parsed = ParsedClusters::default();

    'clusters: for (cluster, tokens) in split_clusters(input) {
        let mut ids: Vec<IndividualId> = Vec::with_capacity(tokens.len());
        let mut seen: HashSet<IndividualId> = HashSet::new();
        for token in tokens {
            let Some(id) = parse_id(token) else {
                parsed.issues.push(malformed(kind, cluster, token));
                continue 'clusters;
            };
            if !seen.insert(id) {
                debug!(%kind, cluster, id, "dropping cluster with repeated id");
                parsed
                    .issues
                    .push(ValidationIssue::DuplicateId { kind, cluster, id });
                continue 'clusters;
            }
            ids.push(id);
        }

        if ids.len() < 2 {
            debug!(%kind, cluster, found = ids.len(), "dropping undersized cluster");
            parsed.issues.push(ValidationIssue::TooFewMembers {
                kind,
                cluster,
                found: ids.len(),
            });
            continue;
        }
        parsed.clusters.push(ids);
    }

    parsed
}

/// Yields `(cluster_number, tokens)` for every non-empty cluster.
fn split_clusters(input: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    input
        .split(';')
        .map(|chunk| {
            chunk
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|tokens| !tokens.is_empty())
        .enumerate()
        .map(|(i, tokens)| (i + 1, tokens))
}

fn parse_id(token: &str) -> Option<IndividualId> {
    token.parse::<IndividualId>().ok().filter(|&id| id > 0)
}

fn parse_range(token: &str) -> Option<(IndividualId, IndividualId)> {
    let (a, b) = token.split_once('-')?;
    let a = parse_id(a.trim())?;
    let b = parse_id(b.trim())?;
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if hi - lo >= MAX_RANGE_SPAN {
        return None;
    }
    Some((lo, hi))
}

fn malformed(kind: ConstraintKind, cluster: usize, token: &str) -> ValidationIssue {
    debug!(%kind, cluster, token, "malformed token");
    ValidationIssue::MalformedToken {
        kind,
        cluster,
        token: token.to_string(),
    }
}
