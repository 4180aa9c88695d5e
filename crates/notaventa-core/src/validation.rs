//! # Validation Module
//!
//! Input validation rules for the sale workflow. These run before any
//! network call; the backend still has the final word on everything it
//! validates server-side.

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length accepted for the free-text observation field.
pub const MAX_OBSERVATION_LEN: usize = 500;

// =============================================================================
// RUT
// =============================================================================

/// Validates a Chilean RUT: digits (dots optional), a dash, and a modulo-11
/// verifier digit (`0-9` or `K`).
///
/// ## Example
/// ```rust
/// use notaventa_core::validation::validate_rut;
///
/// assert!(validate_rut("12.345.678-5").is_ok());
/// assert!(validate_rut("12345678-5").is_ok());
/// assert!(validate_rut("12345678-9").is_err()); // wrong verifier
/// ```
pub fn validate_rut(rut: &str) -> ValidationResult<()> {
    let rut = rut.trim();

    if rut.is_empty() {
        return Err(ValidationError::Required { field: "rut" });
    }

    let compact: String = rut.chars().filter(|c| *c != '.').collect();
    let (body, dv) = compact.split_once('-').ok_or(ValidationError::InvalidFormat {
        field: "rut",
        reason: "falta el dígito verificador (use 12345678-5)".to_string(),
    })?;

    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "rut",
            reason: "el cuerpo debe ser numérico".to_string(),
        });
    }

    let expected = rut_verifier_digit(body);
    let given = dv.to_uppercase();
    if given != expected {
        return Err(ValidationError::InvalidFormat {
            field: "rut",
            reason: format!("dígito verificador incorrecto (esperado {expected})"),
        });
    }

    Ok(())
}

/// Modulo-11 verifier with cyclic weights [2,3,4,5,6,7] applied right to
/// left. 11 maps to "0" and 10 to "K".
fn rut_verifier_digit(body: &str) -> String {
    let weights = [2u32, 3, 4, 5, 6, 7];
    let mut sum: u32 = 0;

    for (i, ch) in body.chars().rev().enumerate() {
        let digit = ch.to_digit(10).unwrap_or(0);
        sum += digit * weights[i % weights.len()];
    }

    match 11 - (sum % 11) {
        11 => "0".to_string(),
        10 => "K".to_string(),
        d => d.to_string(),
    }
}

// =============================================================================
// Field Validators
// =============================================================================

/// Razon social for factura emission: required, bounded.
pub fn validate_razon_social(value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: "razón social",
        });
    }

    if value.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "razón social",
            max: 200,
        });
    }

    Ok(())
}

/// Folio identifiers are positive backend-assigned integers.
pub fn validate_folio(folio: i64) -> ValidationResult<()> {
    if folio <= 0 {
        return Err(ValidationError::MustBePositive { field: "folio" });
    }

    Ok(())
}

/// Observations are optional free text with an upper bound.
pub fn validate_observation(text: &str) -> ValidationResult<()> {
    if text.len() > MAX_OBSERVATION_LEN {
        return Err(ValidationError::TooLong {
            field: "observación",
            max: MAX_OBSERVATION_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rut_accepts_valid_verifiers() {
        assert!(validate_rut("12345678-5").is_ok());
        assert!(validate_rut("12.345.678-5").is_ok());
        assert!(validate_rut("76123456-0").is_ok());
        // Verifier 10 renders as K, case-insensitive on input.
        assert!(validate_rut("20347878-K").is_ok());
        assert!(validate_rut("20347878-k").is_ok());
    }

    #[test]
    fn test_validate_rut_rejects_bad_input() {
        assert!(validate_rut("").is_err());
        assert!(validate_rut("   ").is_err());
        assert!(validate_rut("12345678").is_err()); // no dash
        assert!(validate_rut("12345678-9").is_err()); // wrong verifier
        assert!(validate_rut("abc-5").is_err());
    }

    #[test]
    fn test_verifier_digit_table() {
        assert_eq!(rut_verifier_digit("12345678"), "5");
        assert_eq!(rut_verifier_digit("76123456"), "0");
        assert_eq!(rut_verifier_digit("20347878"), "K");
    }

    #[test]
    fn test_validate_razon_social() {
        assert!(validate_razon_social("Comercial Andes SpA").is_ok());
        assert!(validate_razon_social("").is_err());
        assert!(validate_razon_social("   ").is_err());
        assert!(validate_razon_social(&"a".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_folio() {
        assert!(validate_folio(1).is_ok());
        assert!(validate_folio(0).is_err());
        assert!(validate_folio(-3).is_err());
    }

    #[test]
    fn test_validate_observation() {
        assert!(validate_observation("entrega en bodega central").is_ok());
        assert!(validate_observation(&"x".repeat(MAX_OBSERVATION_LEN)).is_ok());
        assert!(validate_observation(&"x".repeat(MAX_OBSERVATION_LEN + 1)).is_err());
    }
}
