//! Virtual address type.

use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use crate::error::InspectError;

/// Strongly typed virtual address in a target process
///
/// This wrapper around `u64` keeps addresses apart from sizes, page counts,
/// and pagemap offsets, which are all `u64` too and easy to mix up.
///
/// ## Example
///
/// ```rust
/// use procscope_core::types::Address;
///
/// let addr = Address::from(0x1000);
/// let next = addr + 0x100;
/// assert_eq!(next.value(), 0x1100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(u64);

impl Address
{
    /// The null address (0x0)
    pub const ZERO: Self = Address(0);

    /// Create a new address from a `u64` value
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Get the raw `u64` value of this address
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Add an offset to this address, checking for overflow
    ///
    /// A forward memory walk uses this to stop cleanly at the top of the
    /// address space instead of wrapping around to zero.
    ///
    /// ```rust
    /// use procscope_core::types::Address;
    ///
    /// assert_eq!(Address::from(0x1000).checked_add(0x100), Some(Address::from(0x1100)));
    /// assert_eq!(Address::new(u64::MAX).checked_add(1), None);
    /// ```
    pub fn checked_add(self, offset: u64) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address)
    }

    /// Virtual page number of this address for the given page size
    ///
    /// `page_size` must be non-zero.
    pub const fn page_number(self, page_size: u64) -> u64
    {
        self.0 / page_size
    }

    /// `true` if this address is a multiple of `page_size`
    pub const fn is_page_aligned(self, page_size: u64) -> bool
    {
        self.0 % page_size == 0
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:016x}", self.0)
    }
}

impl fmt::LowerHex for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::UpperHex for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

impl Add<u64> for Address
{
    type Output = Address;

    fn add(self, rhs: u64) -> Self::Output
    {
        Address(self.0.wrapping_add(rhs))
    }
}

/// Parses a hexadecimal address, with or without a `0x` prefix.
///
/// ```rust
/// use procscope_core::types::Address;
///
/// assert_eq!("0x7ffd1000".parse::<Address>().unwrap().value(), 0x7ffd_1000);
/// assert_eq!("123ABC".parse::<Address>().unwrap().value(), 0x12_3abc);
/// assert!("xyz".parse::<Address>().is_err());
/// ```
impl FromStr for Address
{
    type Err = InspectError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.is_empty() {
            return Err(InspectError::InvalidArgument("empty address".to_string()));
        }
        u64::from_str_radix(digits, 16)
            .map(Address)
            .map_err(|e| InspectError::InvalidArgument(format!("invalid hex address '{trimmed}': {e}")))
    }
}
