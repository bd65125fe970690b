//! Fair-share derivation and creditor/debtor classification.
use crate::split::{Contribution, Units, ValidationError};

/// How the pool divides among its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FairShare {
    /// Sum of all contributions.
    total_units: Units,

    /// Floor of the per-person share.
    base_share: Units,

    /// Members that owe one unit above `base_share`.
    remainder: usize,

    /// Assigned share per member, in input order.
    shares: Vec<Units>,
}

impl FairShare {
    /// Computes the assigned share of every contributor.
    ///
    /// The `remainder` left by floor division goes one unit at a time to the
    /// largest contributors, ties going to the earlier entry.
    pub fn compute(contributions: &[Contribution]) -> Result<Self, ValidationError> {
        let total_units = contributions
            .iter()
            .try_fold(0 as Units, |sum, c| sum.checked_add(c.get_units()))
            .ok_or(ValidationError::TotalOverflow)?;

        let n = contributions.len() as Units;
        if n == 0 {
            return Ok(FairShare {
                total_units: 0,
                base_share: 0,
                remainder: 0,
                shares: Vec::new(),
            });
        }

        let base_share = total_units / n;
        let remainder = (total_units % n) as usize;
        let mut shares = vec![base_share; contributions.len()];

        // sort_by is stable, so equal contributions keep input order.
        let mut order: Vec<usize> = (0..contributions.len()).collect();
        order.sort_by(|&a, &b| {
            contributions[b]
                .get_units()
                .cmp(&contributions[a].get_units())
        });
        for &index in order.iter().take(remainder) {
            shares[index] += 1;
        }

        Ok(FairShare {
            total_units,
            base_share,
            remainder,
            shares,
        })
    }

    /// Gets the total of all contributions in minor units.
    pub fn get_total_units(&self) -> Units {
        self.total_units
    }

    /// Gets the floor of the per-person share.
    pub fn get_base_share(&self) -> Units {
        self.base_share
    }

    /// Gets how many members carry one extra unit.
    pub fn get_remainder(&self) -> usize {
        self.remainder
    }

    /// Gets the assigned share per contributor, in input order.
    pub fn get_shares(&self) -> &[Units] {
        &self.shares
    }
}

/// A creditor or debtor with an outstanding amount still to settle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Party {
    pub(crate) name: String,
    pub(crate) amount: Units,
}

/// Parties that overpaid and underpaid, each sorted largest first.
#[derive(Debug, Default)]
pub struct Balances {
    pub(crate) creditors: Vec<Party>,
    pub(crate) debtors: Vec<Party>,
}

impl Balances {
    /// Splits contributors into creditors and debtors against their assigned shares.
    /// Contributors whose balance is exactly zero are left out.
    pub fn classify(contributions: &[Contribution], fair_share: &FairShare) -> Self {
        let mut balances = Balances::default();

        for (contribution, &share) in contributions.iter().zip(fair_share.get_shares()) {
            let units = contribution.get_units();
            if units > share {
                balances.creditors.push(Party {
                    name: contribution.get_name().to_string(),
                    amount: units - share,
                });
            } else if units < share {
                balances.debtors.push(Party {
                    name: contribution.get_name().to_string(),
                    amount: share - units,
                });
            }
        }

        balances.creditors.sort_by(|a, b| b.amount.cmp(&a.amount));
        balances.debtors.sort_by(|a, b| b.amount.cmp(&a.amount));
        balances
    }

    /// Total owed to creditors.
    pub fn credit_total(&self) -> Units {
        self.creditors.iter().map(|p| p.amount).sum()
    }

    /// Total owed by debtors.
    pub fn debit_total(&self) -> Units {
        self.debtors.iter().map(|p| p.amount).sum()
    }
}
