//! Transfer request validation
//!
//! Pure functions over the wire request. Fails fast with categorized errors
//! before any cache or ledger I/O happens.

use uuid::Uuid;

use super::error::TransferError;
use super::types::{TransferRequest, ValidatedTransfer};
use crate::money::{self, AmountError};

/// Maximum idempotency key length in octets.
const IDEMPOTENCY_KEY_MAX: usize = 255;

/// Validate a wire request into the form the ledger accepts.
pub fn validate(req: &TransferRequest) -> Result<ValidatedTransfer, TransferError> {
    if req.from_wallet_id.trim().is_empty() {
        return Err(TransferError::InvalidRequest(
            "fromWalletId is required".to_string(),
        ));
    }
    if req.to_wallet_id.trim().is_empty() {
        return Err(TransferError::InvalidRequest(
            "toWalletId is required".to_string(),
        ));
    }
    if req.amount.trim().is_empty() {
        return Err(TransferError::InvalidRequest("amount is required".to_string()));
    }
    if req.idempotency_key.is_empty() {
        return Err(TransferError::InvalidRequest(
            "idempotencyKey is required".to_string(),
        ));
    }
    if req.idempotency_key.len() > IDEMPOTENCY_KEY_MAX {
        return Err(TransferError::InvalidRequest(format!(
            "idempotencyKey exceeds {} bytes",
            IDEMPOTENCY_KEY_MAX
        )));
    }

    let from = parse_wallet_id(&req.from_wallet_id)?;
    let to = parse_wallet_id(&req.to_wallet_id)?;

    if from == to {
        return Err(TransferError::SameWalletTransfer);
    }

    let amount = match money::parse_amount(&req.amount) {
        Ok(amount) => amount,
        Err(AmountError::Unparseable) => {
            return Err(TransferError::InvalidAmount(format!(
                "'{}' is not a valid decimal",
                req.amount
            )));
        }
        Err(AmountError::NotPositive) => {
            return Err(TransferError::InvalidAmount(
                "amount must be greater than zero".to_string(),
            ));
        }
        Err(AmountError::TooSmall) => return Err(TransferError::AmountTooSmall),
        Err(AmountError::TooPrecise) => {
            return Err(TransferError::InvalidAmount(
                "amount supports at most 4 decimal places".to_string(),
            ));
        }
        Err(AmountError::OutOfRange) => {
            return Err(TransferError::InvalidAmount(
                "amount exceeds the supported range".to_string(),
            ));
        }
    };

    Ok(ValidatedTransfer {
        from,
        to,
        amount,
        idempotency_key: req.idempotency_key.clone(),
    })
}

/// Parse a wallet id in canonical 8-4-4-4-12 hex form (case-insensitive).
///
/// Stricter than `Uuid::parse_str`, which also accepts braced, simple and
/// URN forms the API contract does not.
pub fn parse_wallet_id(s: &str) -> Result<Uuid, TransferError> {
    let s = s.trim();
    if !is_canonical_uuid(s) {
        return Err(TransferError::InvalidWalletId(s.to_string()));
    }
    Uuid::parse_str(s).map_err(|_| TransferError::InvalidWalletId(s.to_string()))
}

fn is_canonical_uuid(s: &str) -> bool {
    if s.len() != 36 {
        return false;
    }
    s.bytes().enumerate().all(|(i, b)| match i {
        8 | 13 | 18 | 23 => b == b'-',
        _ => b.is_ascii_hexdigit(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn request(from: &str, to: &str, amount: &str, key: &str) -> TransferRequest {
        TransferRequest {
            from_wallet_id: from.to_string(),
            to_wallet_id: to.to_string(),
            amount: amount.to_string(),
            idempotency_key: key.to_string(),
        }
    }

    const FROM: &str = "11111111-2222-3333-4444-555555555555";
    const TO: &str = "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee";

    #[test]
    fn test_valid_request() {
        let validated = validate(&request(FROM, TO, "100.0000", "t1")).unwrap();
        assert_eq!(validated.from, Uuid::parse_str(FROM).unwrap());
        assert_eq!(validated.to, Uuid::parse_str(TO).unwrap());
        assert_eq!(validated.amount, Decimal::from(100));
        assert_eq!(validated.idempotency_key, "t1");
    }

    #[test]
    fn test_missing_fields() {
        let err = validate(&request("", TO, "1", "k")).unwrap_err();
        assert_eq!(err.code(), "INVALID_REQUEST");

        let err = validate(&request(FROM, "", "1", "k")).unwrap_err();
        assert_eq!(err.code(), "INVALID_REQUEST");

        let err = validate(&request(FROM, TO, "", "k")).unwrap_err();
        assert_eq!(err.code(), "INVALID_REQUEST");

        let err = validate(&request(FROM, TO, "1", "")).unwrap_err();
        assert_eq!(err.code(), "INVALID_REQUEST");
    }

    #[test]
    fn test_key_length_limit() {
        let long_key = "k".repeat(256);
        let err = validate(&request(FROM, TO, "1", &long_key)).unwrap_err();
        assert_eq!(err.code(), "INVALID_REQUEST");

        let max_key = "k".repeat(255);
        assert!(validate(&request(FROM, TO, "1", &max_key)).is_ok());
    }

    #[test]
    fn test_same_wallet_rejected() {
        let err = validate(&request(FROM, FROM, "1", "k")).unwrap_err();
        assert_eq!(err.code(), "SAME_WALLET_TRANSFER");
    }

    #[test]
    fn test_amount_errors() {
        assert_eq!(
            validate(&request(FROM, TO, "abc", "k")).unwrap_err().code(),
            "INVALID_AMOUNT"
        );
        assert_eq!(
            validate(&request(FROM, TO, "-5", "k")).unwrap_err().code(),
            "INVALID_AMOUNT"
        );
        assert_eq!(
            validate(&request(FROM, TO, "0", "k")).unwrap_err().code(),
            "INVALID_AMOUNT"
        );
        assert_eq!(
            validate(&request(FROM, TO, "1.00001", "k")).unwrap_err().code(),
            "INVALID_AMOUNT"
        );
    }

    #[test]
    fn test_amount_too_small() {
        // 0.0001 is the floor
        let validated = validate(&request(FROM, TO, "0.0001", "k")).unwrap();
        assert_eq!(validated.amount, Decimal::from_str("0.0001").unwrap());

        assert_eq!(
            validate(&request(FROM, TO, "0.00009", "k")).unwrap_err().code(),
            "AMOUNT_TOO_SMALL"
        );
    }

    #[test]
    fn test_wallet_id_forms() {
        // Case-insensitive canonical form accepted
        assert!(parse_wallet_id("AAAAAAAA-BBBB-CCCC-DDDD-EEEEEEEEEEEE").is_ok());

        // Non-canonical forms rejected even though Uuid::parse_str takes them
        assert!(parse_wallet_id("aaaaaaaabbbbccccddddeeeeeeeeeeee").is_err());
        assert!(parse_wallet_id("{aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee}").is_err());
        assert!(parse_wallet_id("urn:uuid:aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee").is_err());
        assert!(parse_wallet_id("not-a-uuid").is_err());
        assert!(parse_wallet_id("aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeeg").is_err());
    }

    #[test]
    fn test_validation_is_pure_ordering() {
        // Field-presence checks run before format checks
        let err = validate(&request("", "also-bad", "", "")).unwrap_err();
        assert_eq!(err.code(), "INVALID_REQUEST");
    }
}
