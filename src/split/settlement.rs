//! Greedy settlement of balances and the public entry point of the split.
use tracing::debug;

use crate::split::{
    Balances, FairShare, Individual, Party, SplitConfig, Units, ValidationError, normalize,
};

/// A single payment instruction from a debtor to a creditor.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    /// The paying debtor.
    from: String,

    /// The receiving creditor.
    to: String,

    /// The amount in major units.
    amount: f64,

    /// The exact amount in minor units.
    amount_units: Units,
}

impl Settlement {
    /// Gets the name of the payer.
    pub fn get_from(&self) -> &str {
        &self.from
    }

    /// Gets the name of the payee.
    pub fn get_to(&self) -> &str {
        &self.to
    }

    /// Gets the amount in major units.
    pub fn get_amount(&self) -> f64 {
        self.amount
    }

    /// Gets the exact amount in minor units.
    pub fn get_amount_units(&self) -> Units {
        self.amount_units
    }
}

/// Outcome of splitting one expense pool.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitResult {
    /// Sum of all contributions in major units.
    total_amount: f64,

    /// Unrounded per-person share in major units.
    average_amount: f64,

    /// Transfers in the order they were generated.
    settlements: Vec<Settlement>,

    total_units: Units,
}

impl SplitResult {
    fn empty() -> Self {
        SplitResult {
            total_amount: 0.0,
            average_amount: 0.0,
            settlements: Vec::new(),
            total_units: 0,
        }
    }

    /// Gets the total contributed in major units.
    pub fn get_total_amount(&self) -> f64 {
        self.total_amount
    }

    /// Gets the average contribution in major units.
    pub fn get_average_amount(&self) -> f64 {
        self.average_amount
    }

    /// Gets the settlements in generation order.
    pub fn get_settlements(&self) -> &[Settlement] {
        &self.settlements
    }

    /// Gets the total contributed in minor units.
    pub fn get_total_units(&self) -> Units {
        self.total_units
    }
}

/// Computes the transfers that equalize spending across `individuals`.
///
/// Validation happens up front; on failure no partial result is produced.
/// An empty list settles to a zero result.
pub fn settle(
    config: &SplitConfig,
    individuals: &[Individual],
) -> Result<SplitResult, ValidationError> {
    let contributions = normalize(config, individuals)?;
    if contributions.is_empty() {
        return Ok(SplitResult::empty());
    }

    let fair_share = FairShare::compute(&contributions)?;
    let balances = Balances::classify(&contributions, &fair_share);
    debug_assert_eq!(balances.credit_total(), balances.debit_total());
    debug!(
        total_units = fair_share.get_total_units(),
        base_share = fair_share.get_base_share(),
        remainder = fair_share.get_remainder(),
        creditors = balances.creditors.len(),
        debtors = balances.debtors.len(),
        "classified balances"
    );

    let settlements = match_parties(config, balances);

    let total_units = fair_share.get_total_units();
    let people = contributions.len() as f64;
    let total_amount = config.to_major(total_units);
    Ok(SplitResult {
        total_amount,
        average_amount: total_amount / people,
        settlements,
        total_units,
    })
}

/// Pairs the largest remaining creditor with the largest remaining debtor until
/// both lists run out. Every step exhausts at least one of the two parties.
fn match_parties(config: &SplitConfig, balances: Balances) -> Vec<Settlement> {
    let Balances {
        mut creditors,
        mut debtors,
    } = balances;
    let parties = creditors.len() + debtors.len();
    let mut settlements = Vec::with_capacity(parties.saturating_sub(1));

    let mut creditor_index = 0;
    let mut debtor_index = 0;
    while creditor_index < creditors.len() && debtor_index < debtors.len() {
        let creditor: &mut Party = &mut creditors[creditor_index];
        let debtor: &mut Party = &mut debtors[debtor_index];

        let amount = creditor.amount.min(debtor.amount);
        if amount > 0 {
            settlements.push(Settlement {
                from: debtor.name.clone(),
                to: creditor.name.clone(),
                amount: config.to_major(amount),
                amount_units: amount,
            });
            creditor.amount -= amount;
            debtor.amount -= amount;
        }

        if creditor.amount == 0 {
            creditor_index += 1;
        }
        if debtor.amount == 0 {
            debtor_index += 1;
        }
    }

    settlements
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::*;

    fn transfers(result: &SplitResult) -> Vec<(&str, &str, f64)> {
        result
            .get_settlements()
            .iter()
            .map(|s| (s.get_from(), s.get_to(), s.get_amount()))
            .collect()
    }

    #[test]
    fn test_empty_input() {
        let result = settle(&SplitConfig::default(), &[]).unwrap();
        assert_eq!(result.get_total_amount(), 0.0);
        assert_eq!(result.get_average_amount(), 0.0);
        assert!(result.get_settlements().is_empty());
    }

    #[test]
    fn test_equal_spending() {
        let individuals = vec![
            Individual::with_spent("Alice", 10.0),
            Individual::with_spent("Bob", 10.0),
            Individual::with_spent("Cathy", 10.0),
        ];
        let result = settle(&SplitConfig::default(), &individuals).unwrap();
        assert_eq!(result.get_total_amount(), 30.0);
        assert_eq!(result.get_average_amount(), 10.0);
        assert!(result.get_settlements().is_empty());
    }

    #[test]
    fn test_two_people() {
        let individuals = vec![
            Individual::with_spent("Rich", 20.0),
            Individual::with_spent("Poor", 0.0),
        ];
        let result = settle(&SplitConfig::default(), &individuals).unwrap();
        assert_eq!(result.get_total_amount(), 20.0);
        assert_eq!(result.get_average_amount(), 10.0);
        assert_eq!(transfers(&result), vec![("Poor", "Rich", 10.0)]);
    }

    #[test]
    fn test_largest_first_matching() {
        let individuals = vec![
            Individual::with_spent("A", 70.0),
            Individual::with_spent("B", 50.0),
            Individual::with_spent("C", 0.0),
            Individual::with_spent("D", 0.0),
        ];
        let result = settle(&SplitConfig::default(), &individuals).unwrap();
        assert_eq!(result.get_total_amount(), 120.0);
        assert_eq!(result.get_average_amount(), 30.0);
        assert_eq!(
            transfers(&result),
            vec![("C", "A", 30.0), ("D", "A", 10.0), ("D", "B", 20.0)]
        );
    }

    #[test]
    fn test_decimal_amounts_settle_exactly() {
        let individuals = vec![
            Individual::with_spent("P1", 0.1),
            Individual::with_spent("P2", 0.2),
            Individual::with_spent("P3", 0.3),
        ];
        let result = settle(&SplitConfig::default(), &individuals).unwrap();
        assert_eq!(result.get_total_units(), 60);
        assert_eq!(transfers(&result), vec![("P1", "P3", 0.1)]);
        assert_eq!(result.get_settlements()[0].get_amount_units(), 10);
    }

    #[test]
    fn test_remainder_absorbed_by_top_spender() {
        let individuals = vec![
            Individual::with_units("A", 1.0),
            Individual::with_units("B", 0.0),
            Individual::with_units("C", 0.0),
        ];
        let result = settle(&SplitConfig::new(0.0), &individuals).unwrap();
        assert_eq!(result.get_total_amount(), 1.0);
        assert_eq!(result.get_average_amount(), 1.0 / 3.0);
        assert!(result.get_settlements().is_empty());
    }

    #[test]
    fn test_milli_units() {
        let individuals = vec![
            Individual::with_units("X", 1234.0),
            Individual::with_units("Y", 0.0),
            Individual::with_units("Z", 2.0),
        ];
        let result = settle(&SplitConfig::new(3.0), &individuals).unwrap();
        assert_eq!(result.get_total_units(), 1236);
        let paid: Units = result
            .get_settlements()
            .iter()
            .map(Settlement::get_amount_units)
            .sum();
        assert_eq!(paid, 412 + 410);
        assert_eq!(
            transfers(&result),
            vec![("Y", "X", 0.412), ("Z", "X", 0.41)]
        );
    }

    #[test]
    fn test_units_and_spent_agree() {
        let by_units = vec![
            Individual::with_units("U", 100.0),
            Individual::with_units("V", 0.0),
        ];
        let by_spent = vec![
            Individual::with_spent("U", 1.0),
            Individual::with_spent("V", 0.0),
        ];
        let config = SplitConfig::new(2.0);
        let r1 = settle(&config, &by_units).unwrap();
        let r2 = settle(&config, &by_spent).unwrap();
        assert_eq!(r1.get_total_amount(), 1.0);
        assert_eq!(r1, r2);
    }

    #[test]
    fn test_validation_fails_atomically() {
        let individuals = vec![
            Individual::with_units("Y", 0.0),
            Individual::new("X".to_string(), Some(100.0), Some(1.0)),
        ];
        assert!(matches!(
            settle(&SplitConfig::default(), &individuals),
            Err(ValidationError::AmbiguousContribution { .. })
        ));
    }

    proptest! {
        #[test]
        fn settlements_zero_every_balance(
            amounts in prop::collection::vec(0u64..=1_000_000, 1..=12),
            decimals in 0u32..=4,
        ) {
            let config = SplitConfig::new(decimals as f64);
            let individuals: Vec<Individual> = amounts
                .iter()
                .enumerate()
                .map(|(idx, &units)| Individual::with_units(&format!("P{idx}"), units as f64))
                .collect();

            let result = settle(&config, &individuals).unwrap();
            let contributions = normalize(&config, &individuals).unwrap();
            let fair_share = FairShare::compute(&contributions).unwrap();

            let mut balances: HashMap<&str, i128> = contributions
                .iter()
                .zip(fair_share.get_shares())
                .map(|(c, &share)| (c.get_name(), c.get_units() as i128 - share as i128))
                .collect();
            for s in result.get_settlements() {
                prop_assert!(s.get_amount_units() > 0);
                *balances.get_mut(s.get_from()).unwrap() += s.get_amount_units() as i128;
                *balances.get_mut(s.get_to()).unwrap() -= s.get_amount_units() as i128;
            }
            prop_assert!(balances.values().all(|&b| b == 0));
        }

        #[test]
        fn settlement_total_matches_credit(
            amounts in prop::collection::vec(0u64..=1_000_000, 1..=12),
        ) {
            let config = SplitConfig::new(0.0);
            let individuals: Vec<Individual> = amounts
                .iter()
                .enumerate()
                .map(|(idx, &units)| Individual::with_units(&format!("P{idx}"), units as f64))
                .collect();

            let result = settle(&config, &individuals).unwrap();
            let contributions = normalize(&config, &individuals).unwrap();
            let fair_share = FairShare::compute(&contributions).unwrap();
            let balances = Balances::classify(&contributions, &fair_share);

            let paid: Units = result.get_settlements().iter().map(Settlement::get_amount_units).sum();
            prop_assert_eq!(paid, balances.credit_total());
            prop_assert_eq!(result.get_total_units(), amounts.iter().sum::<u64>());

            let parties = balances.creditors.len() + balances.debtors.len();
            prop_assert!(result.get_settlements().len() <= parties.saturating_sub(1));
        }

        #[test]
        fn equal_spending_needs_no_transfers(
            units in 0u64..=100_000,
            people in 1usize..=10,
        ) {
            let individuals: Vec<Individual> = (0..people)
                .map(|idx| Individual::with_units(&format!("P{idx}"), units as f64))
                .collect();
            let result = settle(&SplitConfig::default(), &individuals).unwrap();
            prop_assert!(result.get_settlements().is_empty());
        }
    }
}
