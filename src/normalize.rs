//! Pure sanitization of the optional checkout sub-documents. No I/O, never
//! fails: anything unusable simply ends up absent.

use crate::{
    dto::orders::{PaymentInput, ShippingInput},
    models::{Payment, Shipping},
};

/// Trim a raw field; whitespace-only input counts as absent.
fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Infer the card brand from the leading digits. Unrecognized prefixes are
/// left absent, not an error.
pub fn detect_card_brand(digits: &str) -> Option<&'static str> {
    match digits.as_bytes() {
        [b'4', ..] => Some("Visa"),
        [b'5', b'1'..=b'5', ..] | [b'2', b'2'..=b'7', ..] => Some("MasterCard"),
        [b'3', b'4' | b'7', ..] => Some("Amex"),
        [b'3', b'6' | b'8', ..] => Some("Diners"),
        [b'3', b'0', b'0'..=b'5', ..] => Some("Diners"),
        [b'6', ..] => Some("Discover"),
        [b'3', b'5', ..] => Some("JCB"),
        _ => None,
    }
}

pub fn build_shipping(raw: &ShippingInput) -> Option<Shipping> {
    let shipping = Shipping {
        nombre: clean(&raw.nombre),
        apellidos: clean(&raw.apellidos),
        direccion: clean(&raw.direccion),
        ciudad: clean(&raw.ciudad),
        provincia: clean(&raw.provincia),
        pais: clean(&raw.pais),
        cp: clean(&raw.cp),
        telefono: clean(&raw.telefono),
        email: clean(&raw.email),
        notas: clean(&raw.notas),
        fecha_nacimiento: clean(&raw.fecha_nacimiento),
    };
    if shipping.is_empty() {
        None
    } else {
        Some(shipping)
    }
}

pub fn build_payment(raw: &PaymentInput) -> Option<Payment> {
    let digits: String = raw
        .card_number
        .as_deref()
        .filter(|s| !s.is_empty())
        .or(raw.last4.as_deref())
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    let last4 = if digits.is_empty() {
        clean(&raw.last4)
    } else {
        Some(digits[digits.len().saturating_sub(4)..].to_string())
    };
    let remember = raw.remember == Some(true);

    let mut payment = Payment {
        method: clean(&raw.method).or_else(|| (!digits.is_empty()).then(|| "card".to_string())),
        brand: clean(&raw.brand).or_else(|| detect_card_brand(&digits).map(str::to_owned)),
        last4,
        holder: clean(&raw.holder),
        exp_month: clean(&raw.exp_month),
        exp_year: clean(&raw.exp_year),
        country: clean(&raw.country),
        remember: remember.then_some(true),
    };

    if !payment.has_details() && !remember {
        return None;
    }
    if payment.method.is_none() {
        payment.method = Some("card".to_string());
    }
    Some(payment)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipping_input(nombre: &str, apellidos: &str) -> ShippingInput {
        ShippingInput {
            nombre: Some(nombre.to_string()),
            apellidos: Some(apellidos.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn shipping_trims_and_drops_empty_fields() {
        let shipping = build_shipping(&shipping_input(" Ana ", "")).unwrap();
        assert_eq!(shipping.nombre.as_deref(), Some("Ana"));
        assert_eq!(shipping.apellidos, None);
        assert_eq!(shipping.direccion, None);
    }

    #[test]
    fn shipping_with_nothing_provided_is_absent() {
        assert_eq!(build_shipping(&ShippingInput::default()), None);
        assert_eq!(build_shipping(&shipping_input("   ", " ")), None);
    }

    #[test]
    fn brand_table() {
        assert_eq!(detect_card_brand("4111111111111111"), Some("Visa"));
        assert_eq!(detect_card_brand("5500000000000004"), Some("MasterCard"));
        assert_eq!(detect_card_brand("2221000000000009"), Some("MasterCard"));
        assert_eq!(detect_card_brand("378282246310005"), Some("Amex"));
        assert_eq!(detect_card_brand("36227206271667"), Some("Diners"));
        assert_eq!(detect_card_brand("30569309025904"), Some("Diners"));
        assert_eq!(detect_card_brand("6011111111111117"), Some("Discover"));
        assert_eq!(detect_card_brand("3530111333300000"), Some("JCB"));
        assert_eq!(detect_card_brand("1234567890123456"), None);
        assert_eq!(detect_card_brand(""), None);
    }

    #[test]
    fn payment_derives_brand_and_last4_from_card_number() {
        let payment = build_payment(&PaymentInput {
            card_number: Some("4111 1111 1111 1111".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(payment.brand.as_deref(), Some("Visa"));
        assert_eq!(payment.last4.as_deref(), Some("1111"));
        assert_eq!(payment.method.as_deref(), Some("card"));
    }

    #[test]
    fn payment_keeps_supplied_brand_and_falls_back_to_last4() {
        let payment = build_payment(&PaymentInput {
            brand: Some("MasterCard".to_string()),
            last4: Some("0004".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(payment.brand.as_deref(), Some("MasterCard"));
        assert_eq!(payment.last4.as_deref(), Some("0004"));
    }

    #[test]
    fn unrecognized_prefix_leaves_brand_absent() {
        let payment = build_payment(&PaymentInput {
            card_number: Some("1234567890123456".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(payment.brand, None);
        assert_eq!(payment.last4.as_deref(), Some("3456"));
    }

    #[test]
    fn empty_payment_is_absent_unless_remember_is_set() {
        assert_eq!(build_payment(&PaymentInput::default()), None);

        let remembered = build_payment(&PaymentInput {
            remember: Some(true),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(remembered.remember, Some(true));
        assert_eq!(remembered.method.as_deref(), Some("card"));
    }
}
