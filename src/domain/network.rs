// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Value Objects with Validation Invariants

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use thiserror::Error;

/// Network validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid IP address format: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid CIDR notation: {0}")]
    InvalidCidr(String),

    #[error("Invalid prefix length: {0} (must be 0-32 for IPv4, 0-128 for IPv6)")]
    InvalidPrefixLength(u8),
}

/// Network range in CIDR notation
///
/// Invariants:
/// - Valid IP address format
/// - Prefix length within valid range for the address family
/// - Host bits are masked off (canonical network address)
///
/// # Examples
///
/// ```rust
/// use cim_inventory::domain::NetworkRange;
///
/// let range = NetworkRange::new("172.20.0.0/16").unwrap();
/// assert!(range.contains(&"172.20.4.7".parse().unwrap()));
/// assert!(!range.contains(&"172.21.0.1".parse().unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkRange {
    network: IpAddr,
    prefix_length: u8,
}

impl NetworkRange {
    /// Parse a range such as `10.0.0.0/8` or `fd00::/64`
    ///
    /// A bare address is treated as a single-host range (/32 or /128).
    pub fn new(cidr: impl AsRef<str>) -> Result<Self, NetworkError> {
        let cidr = cidr.as_ref().trim();

        let (addr_str, prefix) = match cidr.split_once('/') {
            Some((addr_str, prefix_str)) => {
                let prefix = prefix_str
                    .parse::<u8>()
                    .map_err(|_| NetworkError::InvalidCidr(cidr.to_string()))?;
                (addr_str, Some(prefix))
            }
            None => (cidr, None),
        };

        let address = IpAddr::from_str(addr_str)
            .map_err(|_| NetworkError::InvalidIpAddress(addr_str.to_string()))?;

        let max_prefix = max_prefix(&address);
        let prefix_length = prefix.unwrap_or(max_prefix);

        // Invariant: Validate prefix length based on IP version
        if prefix_length > max_prefix {
            return Err(NetworkError::InvalidPrefixLength(prefix_length));
        }

        Ok(Self {
            network: mask(address, prefix_length),
            prefix_length,
        })
    }

    /// Get the network address
    pub fn network(&self) -> IpAddr {
        self.network
    }

    /// Get the prefix length
    pub fn prefix_length(&self) -> u8 {
        self.prefix_length
    }

    /// Check whether an address belongs to this range
    ///
    /// Addresses of the other family never match.
    pub fn contains(&self, address: &IpAddr) -> bool {
        match (self.network, address) {
            (IpAddr::V4(_), IpAddr::V4(_)) | (IpAddr::V6(_), IpAddr::V6(_)) => {
                mask(*address, self.prefix_length) == self.network
            }
            _ => false,
        }
    }
}

fn max_prefix(address: &IpAddr) -> u8 {
    match address {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

fn mask(address: IpAddr, prefix_length: u8) -> IpAddr {
    match address {
        IpAddr::V4(v4) => {
            let bits = u32::from(v4);
            let mask = u32::MAX.checked_shl(32 - u32::from(prefix_length)).unwrap_or(0);
            IpAddr::V4((bits & mask).into())
        }
        IpAddr::V6(v6) => {
            let bits = u128::from(v6);
            let mask = u128::MAX
                .checked_shl(128 - u32::from(prefix_length))
                .unwrap_or(0);
            IpAddr::V6((bits & mask).into())
        }
    }
}

impl fmt::Display for NetworkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_length)
    }
}

impl FromStr for NetworkRange {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for NetworkRange {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NetworkRange {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(&raw).map_err(serde::de::Error::custom)
    }
}

/// Which interface addresses may be used to reach a VM
///
/// An empty policy accepts any well-formed address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressPolicy {
    allowed: Vec<NetworkRange>,
}

impl AddressPolicy {
    /// Accept any well-formed address
    pub fn any() -> Self {
        Self::default()
    }

    /// Accept only addresses inside one of the given ranges
    pub fn within(allowed: Vec<NetworkRange>) -> Self {
        Self { allowed }
    }

    /// Allowed ranges (empty means unrestricted)
    pub fn ranges(&self) -> &[NetworkRange] {
        &self.allowed
    }

    /// Check a candidate address against the policy
    ///
    /// Returns the trimmed text as the source wrote it, not a re-rendered
    /// address.
    pub fn usable<'a>(&self, candidate: &'a str) -> Option<&'a str> {
        let text = candidate.trim();
        let address = IpAddr::from_str(text).ok()?;
        if self.allowed.is_empty() || self.allowed.iter().any(|r| r.contains(&address)) {
            Some(text)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_parsing() {
        let range = NetworkRange::new("172.21.6.0/24").unwrap();
        assert_eq!(range.prefix_length(), 24);
        assert_eq!(range.to_string(), "172.21.6.0/24");

        // Host bits are masked off
        let range = NetworkRange::new("10.1.2.3/8").unwrap();
        assert_eq!(range.to_string(), "10.0.0.0/8");

        let single = NetworkRange::new("192.168.1.10").unwrap();
        assert_eq!(single.prefix_length(), 32);
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(matches!(
            NetworkRange::new("not-an-ip/24"),
            Err(NetworkError::InvalidIpAddress(_))
        ));
        assert!(matches!(
            NetworkRange::new("10.0.0.0/abc"),
            Err(NetworkError::InvalidCidr(_))
        ));
        assert_eq!(
            NetworkRange::new("10.0.0.0/33"),
            Err(NetworkError::InvalidPrefixLength(33))
        );
        assert!(NetworkRange::new("fd00::/129").is_err());
    }

    #[test]
    fn test_contains() {
        let range = NetworkRange::new("172.20.0.0/16").unwrap();
        assert!(range.contains(&"172.20.0.1".parse().unwrap()));
        assert!(range.contains(&"172.20.255.254".parse().unwrap()));
        assert!(!range.contains(&"172.21.0.1".parse().unwrap()));
        assert!(!range.contains(&"::1".parse().unwrap()));

        let everything = NetworkRange::new("0.0.0.0/0").unwrap();
        assert!(everything.contains(&"8.8.8.8".parse().unwrap()));

        let v6 = NetworkRange::new("fd00:1::/32").unwrap();
        assert!(v6.contains(&"fd00:1:ffff::1".parse().unwrap()));
        assert!(!v6.contains(&"fd00:2::1".parse().unwrap()));
    }

    #[test]
    fn test_address_policy() {
        let open = AddressPolicy::any();
        assert!(open.usable("10.0.0.5").is_some());
        assert!(open.usable(" 10.0.0.5 ").is_some());
        assert!(open.usable("").is_none());
        assert!(open.usable("vm.example.com").is_none());
        assert_eq!(open.usable(" 2001:DB8::0001 "), Some("2001:DB8::0001"));

        let restricted = AddressPolicy::within(vec![
            NetworkRange::new("172.20.0.0/16").unwrap(),
            NetworkRange::new("172.21.6.0/24").unwrap(),
        ]);
        assert!(restricted.usable("172.21.6.9").is_some());
        assert!(restricted.usable("172.21.7.9").is_none());
    }

    #[test]
    fn test_range_serde() {
        let range: NetworkRange = serde_json::from_str("\"10.0.0.0/8\"").unwrap();
        assert_eq!(serde_json::to_string(&range).unwrap(), "\"10.0.0.0/8\"");
        assert!(serde_json::from_str::<NetworkRange>("\"10.0.0.0/99\"").is_err());
    }
}
