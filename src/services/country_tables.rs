// src/services/country_tables.rs
//
// Static per-country reference data: ISO 3166 code mapping, 2023 corporate
// tax rates and Q3 2024 central bank base rates. Linear tables are indexed
// into hash maps once on first use; lookups after that are O(1).

use std::collections::HashMap;
use std::sync::OnceLock;

/// World average corporate tax rate, applied when a country is missing
/// from the tax dataset.
pub const WORLD_AVERAGE_CORPORATE_TAX_RATE: f64 = 0.2345;

/// World average central bank rate, applied when a country is missing
/// from the base rate dataset.
pub const WORLD_AVERAGE_BASE_RATE: f64 = 0.1411;

/// Fixed expected market return. Stand-in for a real equity-risk-premium
/// model; there is no live source for this yet.
pub const DEFAULT_MARKET_RETURN_RATE: f64 = 0.2493;

#[derive(Debug, Clone, Copy)]
pub struct CountryInfo {
    pub alpha2: &'static str,
    pub alpha3: &'static str,
    pub name: &'static str,
}

/// Resolves an ISO 3166 alpha-2 code (case-insensitive) to its country
/// record, or None for codes outside the dataset.
pub fn find(alpha2: &str) -> Option<CountryInfo> {
    static INDEX: OnceLock<HashMap<&'static str, CountryInfo>> = OnceLock::new();
    let index = INDEX.get_or_init(|| {
        COUNTRIES
            .iter()
            .map(|&(alpha2, alpha3, name)| {
                (
                    alpha2,
                    CountryInfo {
                        alpha2,
                        alpha3,
                        name,
                    },
                )
            })
            .collect()
    });
    index.get(alpha2.to_ascii_uppercase().as_str()).copied()
}

/// Corporate income tax rate as a fraction, world average when unknown.
pub fn corporate_tax_rate(alpha3: &str) -> f64 {
    static INDEX: OnceLock<HashMap<&'static str, f64>> = OnceLock::new();
    let index = INDEX.get_or_init(|| CORPORATE_TAX_RATES.iter().copied().collect());
    index
        .get(alpha3)
        .map(|pct| pct / 100.0)
        .unwrap_or(WORLD_AVERAGE_CORPORATE_TAX_RATE)
}

/// Central bank base rate as a fraction, world average when unknown.
/// Used as the risk-free rate in CAPM.
pub fn base_rate(alpha3: &str) -> f64 {
    static INDEX: OnceLock<HashMap<&'static str, f64>> = OnceLock::new();
    let index = INDEX.get_or_init(|| BASE_RATES.iter().copied().collect());
    index
        .get(alpha3)
        .map(|pct| pct / 100.0)
        .unwrap_or(WORLD_AVERAGE_BASE_RATE)
}

// ISO 3166 alpha-2 / alpha-3 codes with display names.
static COUNTRIES: &[(&str, &str, &str)] = &[
    ("AF", "AFG", "Afghanistan"),
    ("AO", "AGO", "Angola"),
    ("AL", "ALB", "Albania"),
    ("AD", "AND", "Andorra"),
    ("AE", "ARE", "United Arab Emirates"),
    ("AR", "ARG", "Argentina"),
    ("AM", "ARM", "Armenia"),
    ("AG", "ATG", "Antigua and Barbuda"),
    ("AU", "AUS", "Australia"),
    ("AT", "AUT", "Austria"),
    ("AZ", "AZE", "Azerbaijan"),
    ("BI", "BDI", "Burundi"),
    ("BE", "BEL", "Belgium"),
    ("BJ", "BEN", "Benin"),
    ("BF", "BFA", "Burkina Faso"),
    ("BD", "BGD", "Bangladesh"),
    ("BG", "BGR", "Bulgaria"),
    ("BH", "BHR", "Bahrain"),
    ("BS", "BHS", "Bahamas"),
    ("BA", "BIH", "Bosnia and Herzegovina"),
    ("BY", "BLR", "Belarus"),
    ("BZ", "BLZ", "Belize"),
    ("BO", "BOL", "Bolivia (Plurinational State of)"),
    ("BR", "BRA", "Brazil"),
    ("BB", "BRB", "Barbados"),
    ("BN", "BRN", "Brunei Darussalam"),
    ("BT", "BTN", "Bhutan"),
    ("BW", "BWA", "Botswana"),
    ("CF", "CAF", "Central African Republic"),
    ("CA", "CAN", "Canada"),
    ("CH", "CHE", "Switzerland"),
    ("CL", "CHL", "Chile"),
    ("CN", "CHN", "China"),
    ("CI", "CIV", "Cote d'Ivoire"),
    ("CM", "CMR", "Cameroon"),
    ("CD", "COD", "Democratic Republic of the Congo"),
    ("CG", "COG", "Congo"),
    ("CO", "COL", "Colombia"),
    ("CV", "CPV", "Cabo Verde"),
    ("CR", "CRI", "Costa Rica"),
    ("CU", "CUB", "Cuba"),
    ("CY", "CYP", "Cyprus"),
    ("CZ", "CZE", "Czechia"),
    ("DE", "DEU", "Germany"),
    ("DJ", "DJI", "Djibouti"),
    ("DM", "DMA", "Dominica"),
    ("DK", "DNK", "Denmark"),
    ("DO", "DOM", "Dominican Republic"),
    ("DZ", "DZA", "Algeria"),
    ("EC", "ECU", "Ecuador"),
    ("EG", "EGY", "Egypt"),
    ("ER", "ERI", "Eritrea"),
    ("ES", "ESP", "Spain"),
    ("EE", "EST", "Estonia"),
    ("ET", "ETH", "Ethiopia"),
    ("FI", "FIN", "Finland"),
    ("FJ", "FJI", "Fiji"),
    ("FR", "FRA", "France"),
    ("GA", "GAB", "Gabon"),
    ("GB", "GBR", "United Kingdom of Great Britain and Northern Ireland"),
    ("GE", "GEO", "Georgia"),
    ("GH", "GHA", "Ghana"),
    ("GN", "GIN", "Guinea"),
    ("GM", "GMB", "Gambia"),
    ("GW", "GNB", "Guinea-Bissau"),
    ("GQ", "GNQ", "Equatorial Guinea"),
    ("GR", "GRC", "Greece"),
    ("GD", "GRD", "Grenada"),
    ("GT", "GTM", "Guatemala"),
    ("GY", "GUY", "Guyana"),
    ("HK", "HKG", "China, Hong Kong Special Administrative Region"),
    ("HN", "HND", "Honduras"),
    ("HR", "HRV", "Croatia"),
    ("HT", "HTI", "Haiti"),
    ("HU", "HUN", "Hungary"),
    ("ID", "IDN", "Indonesia"),
    ("IN", "IND", "India"),
    ("IE", "IRL", "Ireland"),
    ("IR", "IRN", "Iran (Islamic Republic of)"),
    ("IQ", "IRQ", "Iraq"),
    ("IS", "ISL", "Iceland"),
    ("IL", "ISR", "Israel"),
    ("IT", "ITA", "Italy"),
    ("JM", "JAM", "Jamaica"),
    ("JO", "JOR", "Jordan"),
    ("JP", "JPN", "Japan"),
    ("KZ", "KAZ", "Kazakhstan"),
    ("KE", "KEN", "Kenya"),
    ("KG", "KGZ", "Kyrgyzstan"),
    ("KH", "KHM", "Cambodia"),
    ("KN", "KNA", "Saint Kitts and Nevis"),
    ("KR", "KOR", "Republic of Korea"),
    ("KP", "PRK", "Democratic People's Republic of Korea"),
    ("KW", "KWT", "Kuwait"),
    ("LA", "LAO", "Lao People's Democratic Republic"),
    ("LB", "LBN", "Lebanon"),
    ("LR", "LBR", "Liberia"),
    ("LY", "LBY", "Libya"),
    ("LC", "LCA", "Saint Lucia"),
    ("LI", "LIE", "Liechtenstein"),
    ("LK", "LKA", "Sri Lanka"),
    ("LS", "LSO", "Lesotho"),
    ("LT", "LTU", "Lithuania"),
    ("LU", "LUX", "Luxembourg"),
    ("LV", "LVA", "Latvia"),
    ("MO", "MAC", "China, Macao Special Administrative Region"),
    ("MA", "MAR", "Morocco"),
    ("MC", "MCO", "Monaco"),
    ("MD", "MDA", "Republic of Moldova"),
    ("MG", "MDG", "Madagascar"),
    ("MV", "MDV", "Maldives"),
    ("MX", "MEX", "Mexico"),
    ("MK", "MKD", "The former Yugoslav Republic of Macedonia"),
    ("ML", "MLI", "Mali"),
    ("MT", "MLT", "Malta"),
    ("MM", "MMR", "Myanmar"),
    ("ME", "MNE", "Montenegro"),
    ("MN", "MNG", "Mongolia"),
    ("MZ", "MOZ", "Mozambique"),
    ("MR", "MRT", "Mauritania"),
    ("MU", "MUS", "Mauritius"),
    ("MW", "MWI", "Malawi"),
    ("MY", "MYS", "Malaysia"),
    ("NA", "NAM", "Namibia"),
    ("NE", "NER", "Niger"),
    ("NG", "NGA", "Nigeria"),
    ("NI", "NIC", "Nicaragua"),
    ("NL", "NLD", "Netherlands"),
    ("NO", "NOR", "Norway"),
    ("NP", "NPL", "Nepal"),
    ("NZ", "NZL", "New Zealand"),
    ("OM", "OMN", "Oman"),
    ("PK", "PAK", "Pakistan"),
    ("PA", "PAN", "Panama"),
    ("PE", "PER", "Peru"),
    ("PH", "PHL", "Philippines"),
    ("PG", "PNG", "Papua New Guinea"),
    ("PL", "POL", "Poland"),
    ("PR", "PRI", "Puerto Rico"),
    ("PT", "PRT", "Portugal"),
    ("PY", "PRY", "Paraguay"),
    ("QA", "QAT", "Qatar"),
    ("RO", "ROU", "Romania"),
    ("RU", "RUS", "Russian Federation"),
    ("RW", "RWA", "Rwanda"),
    ("SA", "SAU", "Saudi Arabia"),
    ("SD", "SDN", "Sudan"),
    ("SN", "SEN", "Senegal"),
    ("SG", "SGP", "Singapore"),
    ("SB", "SLB", "Solomon Islands"),
    ("SL", "SLE", "Sierra Leone"),
    ("SV", "SLV", "El Salvador"),
    ("SM", "SMR", "San Marino"),
    ("SO", "SOM", "Somalia"),
    ("RS", "SRB", "Serbia"),
    ("SS", "SSD", "South Sudan"),
    ("ST", "STP", "Sao Tome and Principe"),
    ("SR", "SUR", "Suriname"),
    ("SK", "SVK", "Slovakia"),
    ("SI", "SVN", "Slovenia"),
    ("SE", "SWE", "Sweden"),
    ("SZ", "SWZ", "Swaziland"),
    ("SC", "SYC", "Seychelles"),
    ("SY", "SYR", "Syrian Arab Republic"),
    ("TD", "TCD", "Chad"),
    ("TG", "TGO", "Togo"),
    ("TH", "THA", "Thailand"),
    ("TJ", "TJK", "Tajikistan"),
    ("TM", "TKM", "Turkmenistan"),
    ("TL", "TLS", "Timor-Leste"),
    ("TO", "TON", "Tonga"),
    ("TT", "TTO", "Trinidad and Tobago"),
    ("TN", "TUN", "Tunisia"),
    ("TR", "TUR", "Turkey"),
    ("TW", "TWN", "Taiwan"),
    ("TZ", "TZA", "United Republic of Tanzania"),
    ("UG", "UGA", "Uganda"),
    ("UA", "UKR", "Ukraine"),
    ("UY", "URY", "Uruguay"),
    ("US", "USA", "United States of America"),
    ("UZ", "UZB", "Uzbekistan"),
    ("VC", "VCT", "Saint Vincent and the Grenadines"),
    ("VE", "VEN", "Venezuela (Bolivarian Republic of)"),
    ("VN", "VNM", "Viet Nam"),
    ("VU", "VUT", "Vanuatu"),
    ("WS", "WSM", "Samoa"),
    ("XK", "XKX", "Kosovo"),
    ("YE", "YEM", "Yemen"),
    ("ZA", "ZAF", "South Africa"),
    ("ZM", "ZMB", "Zambia"),
    ("ZW", "ZWE", "Zimbabwe"),
];

// Corporate tax data for 2023, percent.
static CORPORATE_TAX_RATES: &[(&str, f64)] = &[
    ("AFG", 20.0),
    ("AGO", 25.0),
    ("ALB", 15.0),
    ("ARE", 9.0),
    ("ARG", 35.0),
    ("ARM", 18.0),
    ("ATG", 25.0),
    ("AUS", 30.0),
    ("AUT", 24.0),
    ("AZE", 20.0),
    ("BDI", 30.0),
    ("BEL", 25.0),
    ("BEN", 30.0),
    ("BFA", 27.5),
    ("BGD", 27.5),
    ("BGR", 10.0),
    ("BHR", 0.0),
    ("BHS", 0.0),
    ("BIH", 10.0),
    ("BLR", 20.0),
    ("BLZ", 0.0),
    ("BOL", 25.0),
    ("BRA", 34.0),
    ("BRB", 5.5),
    ("BRN", 18.5),
    ("BTN", 25.0),
    ("BWA", 22.0),
    ("CAF", 30.0),
    ("CAN", 26.21),
    ("CHE", 19.653),
    ("CHL", 27.0),
    ("CHN", 25.0),
    ("CIV", 25.0),
    ("CMR", 33.0),
    ("COD", 30.0),
    ("COG", 28.0),
    ("COL", 35.0),
    ("CPV", 22.44),
    ("CRI", 30.0),
    ("CUB", 35.0),
    ("CYP", 12.5),
    ("CZE", 19.0),
    ("DEU", 29.941),
    ("DJI", 25.0),
    ("DMA", 25.0),
    ("DNK", 22.0),
    ("DOM", 27.0),
    ("DZA", 26.0),
    ("ECU", 25.0),
    ("EGY", 22.5),
    ("ERI", 30.0),
    ("ESP", 25.0),
    ("EST", 20.0),
    ("ETH", 30.0),
    ("FIN", 20.0),
    ("FJI", 20.0),
    ("FRA", 25.825),
    ("GAB", 30.0),
    ("GBR", 25.0),
    ("GEO", 15.0),
    ("GHA", 25.0),
    ("GIN", 25.0),
    ("GMB", 27.0),
    ("GNB", 25.0),
    ("GNQ", 35.0),
    ("GRC", 22.0),
    ("GRD", 28.0),
    ("GTM", 25.0),
    ("GUY", 25.0),
    ("HKG", 16.5),
    ("HND", 30.0),
    ("HRV", 18.0),
    ("HTI", 30.0),
    ("HUN", 9.0),
    ("IDN", 22.0),
    ("IND", 30.0),
    ("IRL", 12.5),
    ("IRN", 25.0),
    ("IRQ", 15.0),
    ("ISL", 20.0),
    ("ISR", 23.0),
    ("ITA", 27.81),
    ("JAM", 25.0),
    ("JOR", 20.0),
    ("JPN", 29.74),
    ("KAZ", 20.0),
    ("KEN", 30.0),
    ("KGZ", 10.0),
    ("KHM", 20.0),
    ("KNA", 33.0),
    ("KOR", 26.5),
    ("KWT", 15.0),
    ("LAO", 20.0),
    ("LBN", 17.0),
    ("LBR", 25.0),
    ("LBY", 20.0),
    ("LCA", 30.0),
    ("LKA", 30.0),
    ("LSO", 25.0),
    ("LTU", 15.0),
    ("LUX", 24.94),
    ("LVA", 20.0),
    ("MAC", 12.0),
    ("MAR", 32.0),
    ("MDA", 12.0),
    ("MDG", 20.0),
    ("MDV", 15.0),
    ("MEX", 30.0),
    ("MKD", 10.0),
    ("MLI", 30.0),
    ("MLT", 35.0),
    ("MMR", 22.0),
    ("MNG", 25.0),
    ("MOZ", 32.0),
    ("MRT", 25.0),
    ("MUS", 15.0),
    ("MWI", 30.0),
    ("MYS", 24.0),
    ("NAM", 32.0),
    ("NER", 30.0),
    ("NGA", 30.0),
    ("NIC", 30.0),
    ("NLD", 25.8),
    ("NOR", 22.0),
    ("NPL", 25.0),
    ("NZL", 28.0),
    ("OMN", 15.0),
    ("PAK", 29.0),
    ("PAN", 25.0),
    ("PER", 29.5),
    ("PHL", 25.0),
    ("PNG", 30.0),
    ("POL", 19.0),
    ("PRI", 37.5),
    ("PRT", 31.5),
    ("PRY", 10.0),
    ("QAT", 10.0),
    ("ROU", 16.0),
    ("RUS", 20.0),
    ("RWA", 30.0),
    ("SAU", 20.0),
    ("SDN", 35.0),
    ("SEN", 30.0),
    ("SGP", 17.0),
    ("SLB", 30.0),
    ("SLE", 25.0),
    ("SLV", 30.0),
    ("SRB", 15.0),
    ("STP", 25.0),
    ("SUR", 36.0),
    ("SVK", 21.0),
    ("SVN", 19.0),
    ("SWE", 20.6),
    ("SWZ", 27.5),
    ("SYC", 25.0),
    ("SYR", 28.0),
    ("TCD", 35.0),
    ("TGO", 27.0),
    ("THA", 20.0),
    ("TJK", 18.0),
    ("TKM", 8.0),
    ("TON", 25.0),
    ("TTO", 30.0),
    ("TUN", 15.0),
    ("TUR", 25.0),
    ("TWN", 20.0),
    ("TZA", 30.0),
    ("UGA", 30.0),
    ("UKR", 18.0),
    ("URY", 25.0),
    ("USA", 25.768),
    ("UZB", 15.0),
    ("VCT", 28.0),
    ("VEN", 34.0),
    ("VNM", 20.0),
    ("VUT", 0.0),
    ("WSM", 27.0),
    ("YEM", 20.0),
    ("ZAF", 27.0),
    ("ZMB", 30.0),
    ("ZWE", 24.72),
];

// Central bank base rates as of Q3 2024, percent.
static BASE_RATES: &[(&str, f64)] = &[
    ("CZE", 4.50),
    ("DNK", 3.10),
    ("DOM", 6.75),
    ("EGY", 27.25),
    ("SWZ", 7.50),
    ("FJI", 0.25),
    ("GMB", 17.00),
    ("GEO", 8.00),
    ("GHA", 29.00),
    ("GTM", 5.00),
    ("HND", 3.00),
    ("HKG", 5.75),
    ("HUN", 7.00),
    ("ISL", 9.25),
    ("IND", 6.50),
    ("IDN", 6.25),
    ("IRN", 23.00),
    ("ISR", 4.50),
    ("JPN", 0.25),
    ("JOR", 7.50),
    ("KAZ", 14.25),
    ("KEN", 13.00),
    ("KWT", 4.25),
    ("KGZ", 9.00),
    ("LBN", 20.00),
    ("MWI", 26.00),
    ("MYS", 3.00),
    ("MEX", 10.75),
    ("MDA", 3.60),
    ("MNG", 11.00),
    ("MAR", 2.75),
    ("MOZ", 14.25),
    ("NAM", 7.50),
    ("NZL", 5.25),
    ("NIC", 7.00),
    ("NGA", 26.75),
    ("MKD", 6.30),
    ("NLD", 3.65),
    ("ZAF", 8.25),
    ("THA", 2.25),
    ("TUR", 30.00),
    ("UKR", 25.00),
    ("GBR", 5.25),
    ("USA", 5.50),
    ("VEN", 58.12),
    ("ZMB", 9.00),
    ("ZWE", 150.00),
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn find_is_case_insensitive() {
        let kz = find("kz").unwrap();
        assert_eq!(kz.alpha3, "KAZ");
        assert_eq!(kz.name, "Kazakhstan");
    }

    #[test]
    fn find_unknown_code_is_none() {
        assert!(find("ZZ").is_none());
        assert!(find("K").is_none());
    }

    #[test]
    fn tax_rate_known_country() {
        assert_eq!(corporate_tax_rate("KAZ"), 0.20);
        assert_eq!(corporate_tax_rate("HUN"), 0.09);
    }

    #[test]
    fn tax_rate_falls_back_to_world_average() {
        assert_eq!(corporate_tax_rate("AND"), WORLD_AVERAGE_CORPORATE_TAX_RATE);
    }

    #[test]
    fn base_rate_known_country() {
        assert_eq!(base_rate("KAZ"), 0.1425);
        assert_eq!(base_rate("USA"), 0.055);
    }

    #[test]
    fn base_rate_falls_back_to_world_average() {
        assert_eq!(base_rate("FRA"), WORLD_AVERAGE_BASE_RATE);
    }

    #[test]
    fn every_tax_entry_has_an_iso_mapping() {
        for (alpha3, _) in CORPORATE_TAX_RATES {
            assert!(
                COUNTRIES.iter().any(|(_, a3, _)| a3 == alpha3),
                "missing ISO mapping for {alpha3}"
            );
        }
    }
}
