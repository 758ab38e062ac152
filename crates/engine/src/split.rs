//! The split calculator.
//!
//! [`compute_shares`] divides an expense total among participants according to
//! the chosen method. It is a pure function: existence checks against the
//! users table belong to the persistence ops, not here.
//!
//! All arithmetic is on integer cents. Equal and percentage splits floor the
//! per-participant amount and hand the leftover cents one each to the earliest
//! participants in input order, so the share amounts always sum to the total
//! exactly.

use std::collections::HashSet;

use uuid::Uuid;

use crate::{EngineError, Money, Percent, ResultEngine, SplitMethod};

/// Split input, one variant per method.
///
/// The shape makes per-method requirements unrepresentable to get wrong: an
/// exact split carries an amount per participant, a percentage split carries a
/// percentage per participant, an equal split carries only ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Split {
    Equal { participants: Vec<Uuid> },
    Exact { participants: Vec<(Uuid, Money)> },
    Percentage { participants: Vec<(Uuid, Percent)> },
}

impl Split {
    pub fn method(&self) -> SplitMethod {
        match self {
            Self::Equal { .. } => SplitMethod::Equal,
            Self::Exact { .. } => SplitMethod::Exact,
            Self::Percentage { .. } => SplitMethod::Percentage,
        }
    }

    /// Participant ids in input order.
    pub fn participant_ids(&self) -> Vec<Uuid> {
        match self {
            Self::Equal { participants } => participants.clone(),
            Self::Exact { participants } => participants.iter().map(|(id, _)| *id).collect(),
            Self::Percentage { participants } => participants.iter().map(|(id, _)| *id).collect(),
        }
    }
}

/// Computes the amount each participant owes, in input order.
///
/// Fails with [`EngineError::Validation`] when:
/// - the total is not positive
/// - the participant list is empty or contains a duplicate id
/// - exact amounts do not sum to the total
/// - percentages do not sum to exactly 100%
pub fn compute_shares(total: Money, split: &Split) -> ResultEngine<Vec<(Uuid, Money)>> {
    if !total.is_positive() {
        return Err(EngineError::Validation(
            "total amount must be > 0".to_string(),
        ));
    }
    validate_participants(split)?;

    match split {
        Split::Equal { participants } => Ok(divide_evenly(total, participants)),
        Split::Exact { participants } => {
            let sum: Money = participants.iter().map(|(_, amount)| *amount).sum();
            if sum != total {
                return Err(EngineError::Validation(format!(
                    "exact amounts sum to {sum}, expected {total}"
                )));
            }
            Ok(participants.clone())
        }
        Split::Percentage { participants } => {
            let sum: Percent = participants.iter().map(|(_, pct)| *pct).sum();
            if sum != Percent::FULL {
                return Err(EngineError::Validation(format!(
                    "percentages sum to {sum}%, expected 100%"
                )));
            }
            Ok(divide_by_percentage(total, participants))
        }
    }
}

fn validate_participants(split: &Split) -> ResultEngine<()> {
    let ids = split.participant_ids();
    if ids.is_empty() {
        return Err(EngineError::Validation(
            "participant list must not be empty".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(ids.len());
    for id in &ids {
        if !seen.insert(*id) {
            return Err(EngineError::Validation(format!(
                "duplicate participant: {id}"
            )));
        }
    }
    Ok(())
}

fn divide_evenly(total: Money, participants: &[Uuid]) -> Vec<(Uuid, Money)> {
    let count = participants.len() as i64;
    let base = total.cents() / count;
    let remainder = total.cents() % count;

    participants
        .iter()
        .enumerate()
        .map(|(idx, id)| {
            let extra = i64::from((idx as i64) < remainder);
            (*id, Money::new(base + extra))
        })
        .collect()
}

fn divide_by_percentage(total: Money, participants: &[(Uuid, Percent)]) -> Vec<(Uuid, Money)> {
    // cents * basis points can exceed i64 for large totals; the quotient is
    // back within range, so widen for the intermediate product only.
    let mut shares: Vec<(Uuid, Money)> = participants
        .iter()
        .map(|(id, pct)| {
            let cents = i128::from(total.cents()) * i128::from(pct.basis_points())
                / i128::from(Percent::FULL.basis_points());
            (*id, Money::new(cents as i64))
        })
        .collect();

    // Floored amounts can undershoot the total by at most participants - 1
    // cents. Hand them out one each, front to back.
    let assigned: i64 = shares.iter().map(|(_, amount)| amount.cents()).sum();
    let mut leftover = total.cents() - assigned;
    for (_, amount) in shares.iter_mut() {
        if leftover == 0 {
            break;
        }
        *amount += Money::new(1);
        leftover -= 1;
    }

    shares
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn equal_divides_exactly() {
        let users = ids(4);
        let shares = compute_shares(
            Money::new(100_00),
            &Split::Equal {
                participants: users.clone(),
            },
        )
        .unwrap();

        assert_eq!(shares.len(), 4);
        for (idx, (id, amount)) in shares.iter().enumerate() {
            assert_eq!(*id, users[idx]);
            assert_eq!(*amount, Money::new(25_00));
        }
    }

    #[test]
    fn equal_hands_remainder_to_first_participants() {
        let users = ids(3);
        let shares = compute_shares(
            Money::new(100_00),
            &Split::Equal {
                participants: users,
            },
        )
        .unwrap();

        let amounts: Vec<i64> = shares.iter().map(|(_, a)| a.cents()).collect();
        assert_eq!(amounts, vec![33_34, 33_33, 33_33]);
        assert_eq!(amounts.iter().sum::<i64>(), 100_00);
    }

    #[test]
    fn equal_rejects_empty_participants() {
        let err = compute_shares(
            Money::new(10_00),
            &Split::Equal {
                participants: vec![],
            },
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn exact_returns_amounts_verbatim() {
        let users = ids(2);
        let shares = compute_shares(
            Money::new(90_00),
            &Split::Exact {
                participants: vec![
                    (users[0], Money::new(75_50)),
                    (users[1], Money::new(14_50)),
                ],
            },
        )
        .unwrap();

        assert_eq!(shares[0].1, Money::new(75_50));
        assert_eq!(shares[1].1, Money::new(14_50));
    }

    #[test]
    fn exact_rejects_amounts_not_summing_to_total() {
        let users = ids(2);
        let err = compute_shares(
            Money::new(90_00),
            &Split::Exact {
                participants: vec![
                    (users[0], Money::new(50_00)),
                    (users[1], Money::new(30_00)),
                ],
            },
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn percentage_divides_by_share() {
        let users = ids(2);
        let shares = compute_shares(
            Money::new(100_00),
            &Split::Percentage {
                participants: vec![
                    (users[0], Percent::from_basis_points(6000)),
                    (users[1], Percent::from_basis_points(4000)),
                ],
            },
        )
        .unwrap();

        assert_eq!(shares[0].1, Money::new(60_00));
        assert_eq!(shares[1].1, Money::new(40_00));
    }

    #[test]
    fn percentage_rejects_sum_other_than_hundred() {
        let users = ids(2);
        let err = compute_shares(
            Money::new(90_00),
            &Split::Percentage {
                participants: vec![
                    (users[0], Percent::from_basis_points(5000)),
                    (users[1], Percent::from_basis_points(4000)),
                ],
            },
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn percentage_distributes_rounding_leftover() {
        let users = ids(3);
        let third = Percent::from_basis_points(3333);
        let shares = compute_shares(
            Money::new(100_00),
            &Split::Percentage {
                participants: vec![
                    (users[0], third),
                    (users[1], third),
                    (users[2], Percent::from_basis_points(3334)),
                ],
            },
        )
        .unwrap();

        let sum: i64 = shares.iter().map(|(_, a)| a.cents()).sum();
        assert_eq!(sum, 100_00);
    }

    #[test]
    fn percentage_survives_extreme_totals() {
        let users = ids(2);
        let total = Money::new(i64::MAX);
        let shares = compute_shares(
            total,
            &Split::Percentage {
                participants: vec![
                    (users[0], Percent::from_basis_points(6000)),
                    (users[1], Percent::from_basis_points(4000)),
                ],
            },
        )
        .unwrap();

        let sum: i64 = shares.iter().map(|(_, a)| a.cents()).sum();
        assert_eq!(sum, total.cents());
    }

    #[test]
    fn duplicate_participant_is_rejected() {
        let user = Uuid::new_v4();
        let err = compute_shares(
            Money::new(10_00),
            &Split::Equal {
                participants: vec![user, user],
            },
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn non_positive_total_is_rejected() {
        let err = compute_shares(
            Money::ZERO,
            &Split::Equal {
                participants: ids(2),
            },
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
