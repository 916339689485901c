use std::fmt;
use std::str::FromStr;

/// Longest carriage id accepted, in characters.
pub const MAX_ID_LEN: usize = 5;
pub const MAX_CAPACITY: u32 = 999;

/// Carriage identifier. Non-empty, case-sensitive, at most `MAX_ID_LEN` characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize)]
#[serde(transparent)]
pub struct CarriageId(String);

impl CarriageId {
    pub fn new(id: &str) -> Option<CarriageId> {
        let len = id.chars().count();
        if len == 0 || len > MAX_ID_LEN {
            return None;
        }
        Some(CarriageId(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CarriageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CarriageType {
    Passenger,
    Buffet,
    Restroom,
    FirstClass,
    /// Result of parsing an unknown type name. Never stored in a train.
    Invalid,
}

impl CarriageType {
    pub fn is_valid(self) -> bool {
        self != CarriageType::Invalid
    }

    pub fn label(self) -> &'static str {
        match self {
            CarriageType::Passenger => "PASSENGER",
            CarriageType::Buffet => "BUFFET",
            CarriageType::Restroom => "RESTROOM",
            CarriageType::FirstClass => "FIRST CLASS",
            CarriageType::Invalid => "INVALID",
        }
    }
}

impl FromStr for CarriageType {
    type Err = std::convert::Infallible;
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let t = match name.to_ascii_lowercase().as_str() {
            "passenger" => CarriageType::Passenger,
            "buffet" => CarriageType::Buffet,
            "restroom" => CarriageType::Restroom,
            "first_class" => CarriageType::FirstClass,
            _ => CarriageType::Invalid,
        };
        Ok(t)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(serde::Serialize)]
pub struct Carriage {
    pub id: CarriageId,
    pub kind: CarriageType,
    pub capacity: u32,
    pub occupancy: u32,
}

impl Carriage {
    pub fn new(id: CarriageId, kind: CarriageType, capacity: u32) -> Carriage {
        Carriage {
            id,
            kind,
            capacity,
            occupancy: 0,
        }
    }

    pub fn free_seats(&self) -> u32 {
        self.capacity - self.occupancy
    }

    /// Seats up to `n` passengers, returning how many fit.
    pub fn board(&mut self, n: u32) -> u32 {
        let seated = n.min(self.free_seats());
        self.occupancy += seated;
        seated
    }
}
