//! Payment card records.

use chrono::{Datelike, DateTime, Utc};
use uuid::Uuid;

use super::{all_ascii_digits, ValidationError, Violation};

/// Client-supplied fields for creating or updating a bank card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankCardParams {
    pub card_number: String,
    pub card_holder: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cvv: String,
    pub description: String,
}

/// A validated payment card record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankCard {
    pub id: Uuid,
    pub user_id: Uuid,
    pub card_number: String,
    pub card_holder: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cvv: String,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}

impl BankCard {
    /// Validate `params` and build a fresh record owned by `user_id`.
    pub fn new(user_id: Uuid, params: BankCardParams) -> Result<Self, ValidationError> {
        Self::validate(&params, Utc::now())?;
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            card_number: params.card_number,
            card_holder: params.card_holder,
            expiry_month: params.expiry_month,
            expiry_year: params.expiry_year,
            cvv: params.cvv,
            description: params.description,
            updated_at: Utc::now(),
        })
    }

    fn validate(params: &BankCardParams, now: DateTime<Utc>) -> Result<(), ValidationError> {
        let mut violations = Vec::new();

        let number_ok =
            (13..=19).contains(&params.card_number.len()) && all_ascii_digits(&params.card_number);
        if !number_ok {
            violations.push(Violation::InvalidCardNumber);
        } else if !luhn_valid(&params.card_number) {
            violations.push(Violation::LuhnFailed);
        }

        if params.card_holder.trim().is_empty() {
            violations.push(Violation::EmptyCardHolder);
        }

        let month = parse_month(&params.expiry_month);
        if month.is_none() {
            violations.push(Violation::InvalidExpiryMonth);
        }

        let year = parse_year(&params.expiry_year);
        if year.is_none() {
            violations.push(Violation::InvalidExpiryYear);
        }

        // Freshness is only decidable once both parts parse.
        if let (Some(month), Some(year)) = (month, year) {
            if (year, month) < (now.year(), now.month() as i32) {
                violations.push(Violation::CardExpired);
            }
        }

        if !matches!(params.cvv.len(), 3 | 4) || !all_ascii_digits(&params.cvv) {
            violations.push(Violation::InvalidCvv);
        }

        ValidationError::check(violations)
    }
}

fn parse_month(s: &str) -> Option<i32> {
    if s.len() != 2 || !all_ascii_digits(s) {
        return None;
    }
    match s.parse::<i32>() {
        Ok(m @ 1..=12) => Some(m),
        _ => None,
    }
}

fn parse_year(s: &str) -> Option<i32> {
    if s.len() != 4 || !all_ascii_digits(s) {
        return None;
    }
    s.parse().ok()
}

/// Luhn checksum: right-to-left, double every second digit, subtract 9 when
/// the doubled value exceeds 9, valid iff the sum is divisible by 10.
fn luhn_valid(number: &str) -> bool {
    let mut sum = 0u32;
    for (i, b) in number.bytes().rev().enumerate() {
        let mut d = u32::from(b - b'0');
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> BankCardParams {
        BankCardParams {
            card_number: "4532015112830366".into(),
            card_holder: "John Doe".into(),
            expiry_month: "12".into(),
            expiry_year: "2099".into(),
            cvv: "123".into(),
            description: "travel card".into(),
        }
    }

    #[test]
    fn valid_card_builds() {
        let card = BankCard::new(Uuid::new_v4(), params()).unwrap();
        assert_eq!(card.card_number, "4532015112830366");
        assert!(!card.id.is_nil());
    }

    #[test]
    fn luhn_rejects_off_by_one() {
        let mut p = params();
        p.card_number = "4532015112830367".into();
        let err = BankCard::new(Uuid::new_v4(), p).unwrap_err();
        assert_eq!(err.violations, vec![Violation::LuhnFailed]);
    }

    #[test]
    fn month_13_is_invalid() {
        let mut p = params();
        p.expiry_month = "13".into();
        let err = BankCard::new(Uuid::new_v4(), p).unwrap_err();
        assert_eq!(err.violations, vec![Violation::InvalidExpiryMonth]);
    }

    #[test]
    fn past_year_is_expired() {
        let mut p = params();
        p.expiry_year = "2020".into();
        let err = BankCard::new(Uuid::new_v4(), p).unwrap_err();
        assert_eq!(err.violations, vec![Violation::CardExpired]);
    }

    #[test]
    fn expiry_in_current_month_is_accepted() {
        let now = Utc::now();
        let mut p = params();
        p.expiry_month = format!("{:02}", now.month());
        p.expiry_year = format!("{:04}", now.year());
        assert!(BankCard::new(Uuid::new_v4(), p).is_ok());
    }

    #[test]
    fn violations_aggregate() {
        let p = BankCardParams {
            card_number: "1234".into(),
            card_holder: "  ".into(),
            expiry_month: "00".into(),
            expiry_year: "20".into(),
            cvv: "12".into(),
            description: String::new(),
        };
        let err = BankCard::new(Uuid::new_v4(), p).unwrap_err();
        assert_eq!(
            err.violations,
            vec![
                Violation::InvalidCardNumber,
                Violation::EmptyCardHolder,
                Violation::InvalidExpiryMonth,
                Violation::InvalidExpiryYear,
                Violation::InvalidCvv,
            ]
        );
    }

    #[test]
    fn luhn_known_vectors() {
        assert!(luhn_valid("4532015112830366"));
        assert!(luhn_valid("79927398713"));
        assert!(!luhn_valid("79927398714"));
    }
}
