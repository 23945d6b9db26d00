use crate::Result;

/// A port argument must be 1-5 ASCII digits naming a port in 1..=65535.
///
/// The value stays a string afterwards: fuzzy matching compares port text.
pub fn validate_port(port: &str) -> Result<()> {
    validate_digits(port, false)
}

/// Fuzzy patterns are port text, so `0` is allowed: it matches `3000` or `8080`.
pub fn validate_fuzzy_port(port: &str) -> Result<()> {
    validate_digits(port, true)
}

fn validate_digits(port: &str, allow_zero: bool) -> Result<()> {
    if port.is_empty() {
        return Err(crate::Error::InvalidPort(
            "Port number must not be empty".to_string(),
        ));
    }

    if port.len() > 5 || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(crate::Error::InvalidPort(format!("'{port}' is not a number")));
    }

    match port.parse::<u32>() {
        Ok(0) if !allow_zero => Err(crate::Error::InvalidPort(
            "Port number must be greater than 0".to_string(),
        )),
        Ok(n) if n > u32::from(u16::MAX) => Err(crate::Error::InvalidPort(format!(
            "'{port}' is out of range"
        ))),
        Ok(_) => Ok(()),
        Err(e) => Err(crate::Error::InvalidPort(format!("'{port}': {e}"))),
    }
}

/// Validate every port argument; `exact` selects the strict numeric rules.
pub fn validate_ports(ports: &[String], exact: bool) -> Result<()> {
    let validate = if exact { validate_port } else { validate_fuzzy_port };
    ports.iter().try_for_each(|port| validate(port))
}
