//! Decoding of the packed hex "address:port" pairs found in /proc/net tables
//!
//! The kernel prints each address as 32-bit words in host (little-endian)
//! order, so an IPv4 address reads back to front by byte and an IPv6 address
//! is four such words. Ports are plain big-endian hex.
use crate::error::AuditError;
use std::net::Ipv6Addr;

/// IPv4-mapped IPv6 prefix as the kernel prints it (word layout).
const MAPPED_PREFIX_WORDS: &str = "0000000000000000FFFF000";
/// IPv4-mapped IPv6 prefix in plain byte order.
const MAPPED_PREFIX_BYTES: &str = "00000000000000000000FFFF";

/// Decode an endpoint such as `0100007F:0050` into `("127.0.0.1", 80)`.
pub fn decode_endpoint(hex_addr_port: &str) -> Result<(String, u16), AuditError> {
    let mut parts = hex_addr_port.split(':');
    let (addr, port) = match (parts.next(), parts.next(), parts.next()) {
        (Some(addr), Some(port), None) => (addr, port),
        _ => {
            return Err(AuditError::FormatError(format!(
                "expected addr:port, got '{}'",
                hex_addr_port
            )))
        }
    };

    let port = u32::from_str_radix(port, 16)
        .map_err(|e| AuditError::FormatError(format!("bad port '{}': {}", port, e)))?;

    Ok((decode_address(addr)?, port as u16))
}

/// Decode a packed hex address of either family into its text form.
pub fn decode_address(hex: &str) -> Result<String, AuditError> {
    if hex.len() <= 8 {
        return decode_ipv4(hex);
    }

    if !hex.is_ascii() {
        return Err(AuditError::FormatError(format!(
            "address contains non-hex characters: {:?}",
            hex
        )));
    }

    if hex.len() != 32 {
        return Err(AuditError::FormatError(format!(
            "IPv6 address must be 32 hex digits, got {}",
            hex.len()
        )));
    }

    if starts_with_ignore_case(hex, MAPPED_PREFIX_WORDS)
        || starts_with_ignore_case(hex, MAPPED_PREFIX_BYTES)
    {
        return Ok(format!("::ffff:{}", decode_ipv4(&hex[24..])?));
    }

    let raw = hex_bytes(hex)?;
    let mut ordered = [0u8; 16];
    for (group, chunk) in raw.chunks_exact(4).enumerate() {
        for (i, byte) in chunk.iter().rev().enumerate() {
            ordered[group * 4 + i] = *byte;
        }
    }

    Ok(Ipv6Addr::from(ordered).to_string())
}

/// Bytes come out in reverse pair order, e.g. `0100007F` -> `127.0.0.1`.
fn decode_ipv4(hex: &str) -> Result<String, AuditError> {
    if hex.is_empty() {
        return Err(AuditError::FormatError("empty address".to_string()));
    }

    let octets: Vec<String> = hex_bytes(hex)?
        .iter()
        .rev()
        .map(|b| b.to_string())
        .collect();

    Ok(octets.join("."))
}

fn hex_bytes(hex: &str) -> Result<Vec<u8>, AuditError> {
    if hex.len() % 2 != 0 || !hex.is_ascii() {
        return Err(AuditError::FormatError(format!(
            "odd-length or non-ASCII hex '{}'",
            hex
        )));
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| AuditError::FormatError(format!("bad hex '{}': {}", hex, e)))
        })
        .collect()
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len() && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
