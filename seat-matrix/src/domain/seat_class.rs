//! Seat class codes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown seat class code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown seat class: {0}")]
pub struct InvalidSeatClass(String);

/// One of the fixed travel classes sold by Bangladesh Railway.
///
/// The declaration order is the enumeration order used everywhere a
/// class has to be picked greedily (mixed-class route search, display).
///
/// # Examples
///
/// ```
/// use seat_matrix::domain::SeatClass;
///
/// let class = SeatClass::parse("AC_B").unwrap();
/// assert_eq!(class, SeatClass::AcBerth);
/// assert!(class.is_berth());
/// assert_eq!(class.code(), "AC_B");
///
/// assert!(SeatClass::parse("FIRST").is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum SeatClass {
    SChair,
    Shovan,
    Snigdha,
    FirstSeat,
    FirstChair,
    AcSeat,
    FirstBerth,
    AcBerth,
    Shulov,
    AcChair,
}

impl SeatClass {
    /// Every class, in enumeration order.
    pub const ALL: [SeatClass; 10] = [
        SeatClass::SChair,
        SeatClass::Shovan,
        SeatClass::Snigdha,
        SeatClass::FirstSeat,
        SeatClass::FirstChair,
        SeatClass::AcSeat,
        SeatClass::FirstBerth,
        SeatClass::AcBerth,
        SeatClass::Shulov,
        SeatClass::AcChair,
    ];

    /// Parse the wire code used by the remote service.
    pub fn parse(s: &str) -> Result<Self, InvalidSeatClass> {
        let class = match s.trim().to_ascii_uppercase().as_str() {
            "S_CHAIR" => SeatClass::SChair,
            "SHOVAN" => SeatClass::Shovan,
            "SNIGDHA" => SeatClass::Snigdha,
            "F_SEAT" => SeatClass::FirstSeat,
            "F_CHAIR" => SeatClass::FirstChair,
            "AC_S" => SeatClass::AcSeat,
            "F_BERTH" => SeatClass::FirstBerth,
            "AC_B" => SeatClass::AcBerth,
            "SHULOV" => SeatClass::Shulov,
            "AC_CHAIR" => SeatClass::AcChair,
            _ => return Err(InvalidSeatClass(s.to_string())),
        };
        Ok(class)
    }

    /// Wire code for this class.
    pub fn code(self) -> &'static str {
        match self {
            SeatClass::SChair => "S_CHAIR",
            SeatClass::Shovan => "SHOVAN",
            SeatClass::Snigdha => "SNIGDHA",
            SeatClass::FirstSeat => "F_SEAT",
            SeatClass::FirstChair => "F_CHAIR",
            SeatClass::AcSeat => "AC_S",
            SeatClass::FirstBerth => "F_BERTH",
            SeatClass::AcBerth => "AC_B",
            SeatClass::Shulov => "SHULOV",
            SeatClass::AcChair => "AC_CHAIR",
        }
    }

    /// Berth classes carry a fixed bedding surcharge on top of the base fare.
    pub fn is_berth(self) -> bool {
        matches!(self, SeatClass::FirstBerth | SeatClass::AcBerth)
    }
}

impl fmt::Display for SeatClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<String> for SeatClass {
    type Error = InvalidSeatClass;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SeatClass::parse(&value)
    }
}

impl From<SeatClass> for String {
    fn from(value: SeatClass) -> Self {
        value.code().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_codes_roundtrip() {
        for class in SeatClass::ALL {
            assert_eq!(SeatClass::parse(class.code()).unwrap(), class);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(SeatClass::parse("s_chair").unwrap(), SeatClass::SChair);
        assert_eq!(SeatClass::parse(" Snigdha ").unwrap(), SeatClass::Snigdha);
    }

    #[test]
    fn only_berths_are_berths() {
        let berths: Vec<_> = SeatClass::ALL.into_iter().filter(|c| c.is_berth()).collect();
        assert_eq!(berths, vec![SeatClass::FirstBerth, SeatClass::AcBerth]);
    }

    #[test]
    fn enumeration_order_matches_ord() {
        let mut sorted = SeatClass::ALL;
        sorted.sort();
        assert_eq!(sorted, SeatClass::ALL);
    }

    #[test]
    fn serde_uses_wire_code() {
        let json = serde_json::to_string(&SeatClass::AcChair).unwrap();
        assert_eq!(json, "\"AC_CHAIR\"");
        let back: SeatClass = serde_json::from_str("\"F_BERTH\"").unwrap();
        assert_eq!(back, SeatClass::FirstBerth);
        assert!(serde_json::from_str::<SeatClass>("\"BOGUS\"").is_err());
    }
}
