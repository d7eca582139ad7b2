//! `otpauth://` provisioning URIs
//!
//! Authenticator apps parse these literally (usually from a QR code), so the
//! layout below is a fixed contract:
//!
//! `otpauth://totp/{issuer}:{label}?secret={secret}&issuer={issuer}&period={period}&digits={digits}`

use urlencoding::encode;

/// Build a TOTP provisioning URI
///
/// Issuer and label are percent-encoded (RFC 3986 unreserved characters are
/// kept, spaces become `%20`). The secret is inserted as-is since Base32 text
/// is already URI safe.
///
/// # Example
/// ```
/// use eventdesk_shared::utils::provisioning::provisioning_uri;
///
/// let uri = provisioning_uri("EventDesk", "admin", "JBSWY3DPEHPK3PXP", 30, 6);
/// assert_eq!(
///     uri,
///     "otpauth://totp/EventDesk:admin?secret=JBSWY3DPEHPK3PXP&issuer=EventDesk&period=30&digits=6"
/// );
/// ```
pub fn provisioning_uri(
    issuer: &str,
    label: &str,
    secret_b32: &str,
    period: u64,
    digits: u32,
) -> String {
    let issuer = encode(issuer);
    format!(
        "otpauth://totp/{issuer}:{label}?secret={secret_b32}&issuer={issuer}&period={period}&digits={digits}",
        label = encode(label),
    )
}
