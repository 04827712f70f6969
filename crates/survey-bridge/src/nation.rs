/// UK nation a small-area code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nation {
    England,
    Scotland,
    Wales,
    NorthernIreland,
}

impl Nation {
    /// Output order of the per-nation decile fields.
    pub const DECILE_ORDER: [Nation; 4] = [
        Nation::England,
        Nation::Scotland,
        Nation::NorthernIreland,
        Nation::Wales,
    ];

    /// Derives the nation from the leading character of an LSOA/data zone code.
    ///
    /// Northern Ireland super output areas published with a leading `9` are
    /// folded into `N`. Any other leading character yields `None`.
    pub fn from_area_code(code: &str) -> Option<Self> {
        match code.trim_start().chars().next()? {
            'E' => Some(Self::England),
            'S' => Some(Self::Scotland),
            'W' => Some(Self::Wales),
            'N' | '9' => Some(Self::NorthernIreland),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::England => "England",
            Self::Scotland => "Scotland",
            Self::Wales => "Wales",
            Self::NorthernIreland => "Northern Ireland",
        }
    }

    pub fn decile_field(self) -> &'static str {
        match self {
            Self::England => "E_IMD_decile",
            Self::Scotland => "S_IMD_decile",
            Self::Wales => "W_IMD_decile",
            Self::NorthernIreland => "N_IMD_decile",
        }
    }
}
