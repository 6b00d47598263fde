use std::fmt;

/// Tunnel endpoint identifier carried in every G-PDU - TS29.281, 5.1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Teid(pub u32);

impl Teid {
    // TEID 0 is reserved for signalling and never identifies a userplane tunnel - TS29.281, 4.4.2.3.
    pub const RESERVED: Teid = Teid(0);

    pub fn is_reserved(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Teid {
    fn from(value: u32) -> Self {
        Teid(value)
    }
}

impl fmt::Display for Teid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
