//! Pollutant and region lookup tables.
//!
//! Pollutant codes were found by varying the AirNow download form and
//! intercepting the resulting data-link requests. Some pollutants need more
//! than one code passed together (PM2.5 needs both 88101 and 88502).

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pollutant {
    Co,
    Pb,
    No2,
    O3,
    Pm10,
    Pm25,
    So2,
}

impl Pollutant {
    pub const ALL: [Pollutant; 7] = [
        Pollutant::Co,
        Pollutant::Pb,
        Pollutant::No2,
        Pollutant::O3,
        Pollutant::Pm10,
        Pollutant::Pm25,
        Pollutant::So2,
    ];

    /// Case-insensitive match against the canonical names.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Pollutant::Co => "CO",
            Pollutant::Pb => "Pb",
            Pollutant::No2 => "NO2",
            Pollutant::O3 => "O3",
            Pollutant::Pm10 => "PM10",
            Pollutant::Pm25 => "PM2.5",
            Pollutant::So2 => "SO2",
        }
    }

    pub fn codes(&self) -> &'static [&'static str] {
        match self {
            Pollutant::Co => &["42101"],
            Pollutant::Pb => &["12128", "14129", "85129"],
            Pollutant::No2 => &["42602"],
            Pollutant::O3 => &["44201"],
            Pollutant::Pm10 => &["81102"],
            Pollutant::Pm25 => &["88101", "88502"],
            Pollutant::So2 => &["42401"],
        }
    }

    /// The full code set as the data-link broker expects it.
    pub fn joined_codes(&self) -> String {
        self.codes().join(",")
    }

    pub fn names() -> String {
        Self::ALL
            .iter()
            .map(|p| p.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn codes_for(pollutant: &str) -> Option<&'static [&'static str]> {
    Pollutant::from_name(pollutant).map(|p| p.codes())
}

/// (abbreviation, FIPS state code)
pub const REGIONS: [(&str, &str); 51] = [
    ("AL", "01"), ("AK", "02"), ("AZ", "04"), ("AR", "05"), ("CA", "06"),
    ("CO", "08"), ("CT", "09"), ("DE", "10"), ("DC", "11"), ("FL", "12"),
    ("GA", "13"), ("HI", "15"), ("ID", "16"), ("IL", "17"), ("IN", "18"),
    ("IA", "19"), ("KS", "20"), ("KY", "21"), ("LA", "22"), ("ME", "23"),
    ("MD", "24"), ("MA", "25"), ("MI", "26"), ("MN", "27"), ("MS", "28"),
    ("MO", "29"), ("MT", "30"), ("NE", "31"), ("NV", "32"), ("NH", "33"),
    ("NJ", "34"), ("NM", "35"), ("NY", "36"), ("NC", "37"), ("ND", "38"),
    ("OH", "39"), ("OK", "40"), ("OR", "41"), ("PA", "42"), ("RI", "44"),
    ("SC", "45"), ("SD", "46"), ("TN", "47"), ("TX", "48"), ("UT", "49"),
    ("VT", "50"), ("VA", "51"), ("WA", "53"), ("WV", "54"), ("WI", "55"),
    ("WY", "56"),
];

pub fn region_code_for(abbreviation: &str) -> Option<&'static str> {
    REGIONS
        .iter()
        .find(|(abbr, _)| abbr.eq_ignore_ascii_case(abbreviation))
        .map(|(_, code)| *code)
}

pub fn abbreviation_for(region_code: &str) -> Option<&'static str> {
    REGIONS
        .iter()
        .find(|(_, code)| *code == region_code)
        .map(|(abbr, _)| *abbr)
}

pub fn all_region_codes() -> Vec<&'static str> {
    REGIONS.iter().map(|(_, code)| *code).collect()
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn should_have_codes_for_every_pollutant() {
        for p in Pollutant::ALL {
            let codes = codes_for(p.name()).unwrap();
            assert!(!codes.is_empty());
        }
    }

    #[test]
    fn should_join_particulate_codes() {
        assert_eq!(codes_for("PM2.5"), Some(&["88101", "88502"][..]));
        assert_eq!(Pollutant::Pm25.joined_codes(), "88101,88502");
        assert_eq!(Pollutant::Pb.joined_codes(), "12128,14129,85129");
    }

    #[test]
    fn should_match_pollutant_case_insensitively() {
        assert_eq!(Pollutant::from_name("pb"), Some(Pollutant::Pb));
        assert_eq!(Pollutant::from_name("pm2.5"), Some(Pollutant::Pm25));
        assert_eq!(Pollutant::from_name("PM25"), None);
        assert_eq!(codes_for("smoke"), None);
    }

    #[test]
    fn should_map_regions_both_ways() {
        for (abbr, code) in REGIONS {
            assert_eq!(region_code_for(abbreviation_for(code).unwrap()), Some(code));
            assert_eq!(abbreviation_for(region_code_for(abbr).unwrap()), Some(abbr));
        }
    }

    #[test]
    fn should_have_unique_region_entries() {
        let abbrs: HashSet<_> = REGIONS.iter().map(|(a, _)| a).collect();
        let codes: HashSet<_> = REGIONS.iter().map(|(_, c)| c).collect();

        assert_eq!(abbrs.len(), REGIONS.len());
        assert_eq!(codes.len(), REGIONS.len());
        assert!(codes.iter().all(|c| c.len() == 2));
    }

    #[test]
    fn should_look_up_washington() {
        assert_eq!(region_code_for("WA"), Some("53"));
        assert_eq!(region_code_for("wa"), Some("53"));
        assert_eq!(abbreviation_for("53"), Some("WA"));
        assert_eq!(abbreviation_for("03"), None);
        assert_eq!(region_code_for("XX"), None);
    }
}
