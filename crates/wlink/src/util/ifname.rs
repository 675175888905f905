//! Interface name and index utilities.
//!
//! Everything here reads `/sys/class/net`.

use std::path::Path;

const SYSFS_NET: &str = "/sys/class/net";

/// Maximum interface name length (including null terminator).
pub const IFNAMSIZ: usize = 16;

/// Error type for interface operations.
#[derive(Debug, thiserror::Error)]
pub enum IfError {
    #[error("interface not found: {0}")]
    NotFound(String),

    #[error("invalid interface name: {0}")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IfError>;

impl From<IfError> for crate::netlink::Error {
    fn from(err: IfError) -> Self {
        match err {
            IfError::NotFound(name) => Self::InterfaceNotFound { name },
            IfError::InvalidName(reason) => Self::InvalidArgument(reason),
            IfError::Io(e) => Self::Io(e),
        }
    }
}

/// Validate an interface name.
pub fn validate(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(IfError::InvalidName("empty name".to_string()));
    }

    if name.len() >= IFNAMSIZ {
        return Err(IfError::InvalidName(format!(
            "name too long (max {} chars)",
            IFNAMSIZ - 1
        )));
    }

    if name.contains('/') || name.contains('\0') {
        return Err(IfError::InvalidName(
            "name contains invalid characters".to_string(),
        ));
    }

    if name.chars().any(|c| c.is_whitespace()) {
        return Err(IfError::InvalidName("name contains whitespace".to_string()));
    }

    Ok(())
}

/// Convert an interface index to name.
pub fn index_to_name(index: u32) -> Result<String> {
    if index == 0 {
        return Err(IfError::NotFound("index 0".to_string()));
    }

    for entry in std::fs::read_dir(SYSFS_NET)?.flatten() {
        let path = entry.path().join("ifindex");
        if let Ok(content) = std::fs::read_to_string(&path)
            && let Ok(idx) = content.trim().parse::<u32>()
            && idx == index
        {
            return Ok(entry.file_name().to_string_lossy().to_string());
        }
    }

    Err(IfError::NotFound(format!("index {}", index)))
}

/// Convert an interface name to index.
pub fn name_to_index(name: &str) -> Result<u32> {
    validate(name)?;

    let path = format!("{SYSFS_NET}/{name}/ifindex");
    let content =
        std::fs::read_to_string(&path).map_err(|_| IfError::NotFound(name.to_string()))?;

    content
        .trim()
        .parse()
        .map_err(|_| IfError::NotFound(name.to_string()))
}

/// Get all interface names, sorted.
pub fn list_interfaces() -> Result<Vec<String>> {
    let mut names: Vec<String> = std::fs::read_dir(SYSFS_NET)?
        .flatten()
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect();

    names.sort();
    Ok(names)
}

/// Whether `name` is driven by a cfg80211 wireless driver.
pub fn is_wireless(name: &str) -> bool {
    validate(name).is_ok() && Path::new(SYSFS_NET).join(name).join("wireless").exists()
}

/// Names of wireless interfaces, sorted.
pub fn list_wireless_interfaces() -> Result<Vec<String>> {
    Ok(list_interfaces()?
        .into_iter()
        .filter(|name| is_wireless(name))
        .collect())
}

/// Look up an interface given by name or by numeric index.
///
/// Returns `(name, index)` either way.
pub fn resolve(s: &str) -> Result<(String, u32)> {
    if let Ok(index) = s.parse::<u32>() {
        let name = index_to_name(index)?;
        Ok((name, index))
    } else {
        let index = name_to_index(s)?;
        Ok((s.to_string(), index))
    }
}

/// Source of interface names and indices for the scanner.
pub trait InterfaceResolver: Send + Sync {
    /// Every interface name.
    fn list_interfaces(&self) -> crate::netlink::Result<Vec<String>>;

    /// Kernel index of `name`.
    fn index_of(&self, name: &str) -> crate::netlink::Result<u32>;
}

/// [`InterfaceResolver`] backed by sysfs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysfsInterfaces;

impl InterfaceResolver for SysfsInterfaces {
    fn list_interfaces(&self) -> crate::netlink::Result<Vec<String>> {
        Ok(list_interfaces()?)
    }

    fn index_of(&self, name: &str) -> crate::netlink::Result<u32> {
        Ok(name_to_index(name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::Error;

    #[test]
    fn test_validate() {
        assert!(validate("wlan0").is_ok());
        assert!(validate("wlp3s0").is_ok());
        assert!(validate("lo").is_ok());

        assert!(validate("").is_err());
        assert!(validate("this_name_is_way_too_long_for_an_interface").is_err());
        assert!(validate("wlan/0").is_err());
        assert!(validate("wlan 0").is_err());
    }

    #[test]
    fn test_list_interfaces() {
        // This should at least find "lo"
        let interfaces = list_interfaces().unwrap();
        assert!(interfaces.contains(&"lo".to_string()));
        assert!(!is_wireless("lo"));
    }

    #[test]
    fn test_loopback_index() {
        let index = SysfsInterfaces.index_of("lo").unwrap();
        assert_eq!(index_to_name(index).unwrap(), "lo");
    }

    #[test]
    fn test_resolve_name_or_index() {
        let (name, index) = resolve("lo").unwrap();
        assert_eq!(name, "lo");
        assert_eq!(resolve(&index.to_string()).unwrap(), ("lo".to_string(), index));

        assert!(matches!(resolve("0"), Err(IfError::NotFound(_))));
        assert!(matches!(resolve("nosuchwlan9"), Err(IfError::NotFound(_))));
    }

    #[test]
    fn test_missing_interface_maps_to_error() {
        let err = SysfsInterfaces.index_of("nosuchwlan9").unwrap_err();
        assert!(matches!(err, Error::InterfaceNotFound { ref name } if name == "nosuchwlan9"));
        assert!(err.is_not_found());

        let err = SysfsInterfaces.index_of("bad name").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
