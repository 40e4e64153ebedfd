//! Role ranks for coarse seniority checks.

use crate::error::Violation;
use crate::types::RoleName;
use std::collections::BTreeMap;

/// Roles ordered by seniority.
///
/// Ranks never feed into the permission matrix; a role gets exactly the
/// matrix entries declared for it.
#[derive(Debug, Clone)]
pub struct RoleHierarchy {
    ranks: BTreeMap<RoleName, u32>,
    by_rank: Vec<RoleName>,
}

impl RoleHierarchy {
    /// Build a hierarchy, rejecting shared and skipped ranks.
    ///
    /// Ranks must form one run of consecutive integers starting at the
    /// lowest declared rank.
    pub fn new(ranks: BTreeMap<RoleName, u32>) -> Result<Self, Vec<Violation>> {
        if ranks.is_empty() {
            return Err(vec![Violation::NoRoles]);
        }

        let mut ordered: Vec<(&RoleName, u32)> = ranks.iter().map(|(r, k)| (r, *k)).collect();
        ordered.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));

        let mut violations = Vec::new();
        let mut expected = ordered[0].1;
        for pair in ordered.windows(2) {
            let (prev_role, prev_rank) = pair[0];
            let (role, rank) = pair[1];
            if rank == prev_rank {
                violations.push(Violation::DuplicateRank {
                    rank,
                    first: prev_role.clone(),
                    second: role.clone(),
                });
                continue;
            }
            expected += 1;
            if rank != expected {
                violations.push(Violation::NonContiguousRank {
                    expected,
                    found: rank,
                    role: role.clone(),
                });
                expected = rank;
            }
        }

        if !violations.is_empty() {
            return Err(violations);
        }

        let by_rank = ordered.into_iter().map(|(role, _)| role.clone()).collect();
        Ok(Self { ranks, by_rank })
    }

    pub fn rank(&self, role: &str) -> Option<u32> {
        self.ranks.get(role).copied()
    }

    pub fn contains(&self, role: &str) -> bool {
        self.ranks.contains_key(role)
    }

    /// Roles from least to most senior.
    pub fn roles(&self) -> &[RoleName] {
        &self.by_rank
    }

    /// `Some(true)` when `role` ranks at or above `min_role`, `None` when
    /// either role is undeclared.
    pub fn at_least(&self, role: &str, min_role: &str) -> Option<bool> {
        Some(self.rank(role)? >= self.rank(min_role)?)
    }
}
