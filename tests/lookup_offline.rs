use chrono::NaiveDate;

use cobranzas::lookup::{RegistryClient, is_valid_dni, is_valid_ruc};

#[test]
fn dni_must_be_eight_digits() {
    assert!(is_valid_dni("12345678"));
    assert!(!is_valid_dni("1234567"));
    assert!(!is_valid_dni("123456789"));
    assert!(!is_valid_dni("1234567a"));
    assert!(!is_valid_dni(""));
}

#[test]
fn ruc_must_be_eleven_digits() {
    assert!(is_valid_ruc("20123456789"));
    assert!(!is_valid_ruc("2012345678"));
    assert!(!is_valid_ruc("201234567890"));
    assert!(!is_valid_ruc("20123x56789"));
}

// Without credentials the client must degrade to None without touching the
// network, for malformed and well-formed numbers alike.
#[tokio::test]
async fn unconfigured_registry_returns_none() {
    let registry = RegistryClient::new(None);
    assert!(!registry.enabled());
    assert!(registry.consulta_dni("12345678").await.is_none());
    assert!(registry.consulta_dni("no-es-dni").await.is_none());
    assert!(registry.consulta_ruc("20123456789").await.is_none());
    assert!(
        registry
            .tipo_cambio(NaiveDate::from_ymd_opt(2024, 4, 10).unwrap())
            .await
            .is_none()
    );
}
