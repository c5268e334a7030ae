//! Company profile records and sheet-row validation.

use crate::error::{Error, Result};

/// Sheet column names. These match the listings spreadsheet verbatim,
/// including the doubled spaces in the rate headers and the trailing space
/// in `AVAILABILITY `.
pub mod columns {
    pub const ID: &str = "ID";
    pub const BRIDGE_MESSAGE: &str = "BRIDGE MESSAGE";
    pub const COMPANY_IMAGE: &str = "COMPANY IMAGE";
    pub const COMPANY: &str = "COMPANY";
    pub const OWNER_DRIVER: &str = "OWNER / DRIVER";
    pub const LANGUAGES_A: &str = "LANGUAGES - A";
    pub const LANGUAGES_B: &str = "LANGUAGES - B";
    pub const RATE_I: &str = "RATE & SERVICES  ( I )";
    pub const RATE_II: &str = "RATE & SERVICES  ( II )";
    pub const RATE_III: &str = "RATE & SERVICES  ( III )";
    pub const RATE_IV: &str = "RATE & SERVICES  ( IV )";
    pub const VEHICLE_MODEL: &str = "VEHICLE MODEL";
    pub const LICENSED: &str = "LICENSED";
    pub const COVERAGE: &str = "COVERAGE";
    pub const SERVICES: &str = "SERVICES";
    pub const CUSTOM_OFFERS: &str = "CUSTOM OFFERS";
    pub const AVAILABILITY: &str = "AVAILABILITY ";
    pub const CONTACT_METHOD: &str = "CONTACT METHOD";
    pub const THANK_YOU_MESSAGE: &str = "THANK YOU MESSAGE";
}

/// Every column a full listing must fill in.
const REQUIRED_COLUMNS: &[&str] = &[
    columns::ID,
    columns::BRIDGE_MESSAGE,
    columns::COMPANY_IMAGE,
    columns::COMPANY,
    columns::OWNER_DRIVER,
    columns::LANGUAGES_A,
    columns::LANGUAGES_B,
    columns::RATE_I,
    columns::RATE_II,
    columns::RATE_III,
    columns::RATE_IV,
    columns::VEHICLE_MODEL,
    columns::LICENSED,
    columns::COVERAGE,
    columns::SERVICES,
    columns::CUSTOM_OFFERS,
    columns::AVAILABILITY,
    columns::CONTACT_METHOD,
    columns::THANK_YOU_MESSAGE,
];

/// A validated company record.
///
/// `details` is `None` for minimal listings: id and bridge message only,
/// with no company name. Those get the bridge reply and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyProfile {
    pub id: String,
    pub bridge_message: String,
    /// Image attached to the detailed reply.
    pub company_image: Option<String>,
    pub details: Option<CompanyDetails>,
}

/// Full listing fields, present once a record names its company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyDetails {
    pub company: String,
    pub owner_driver: String,
    /// Spoken languages, in sheet order.
    pub languages: Vec<String>,
    /// Rate lines I through IV.
    pub service_rates: Vec<String>,
    pub vehicle_model: String,
    pub licensed: String,
    pub coverage: String,
    pub services: String,
    pub custom_offers: String,
    pub availability: String,
    pub contact_method: String,
    pub thank_you_message: String,
}

impl CompanyProfile {
    #[must_use]
    pub fn is_minimal(&self) -> bool {
        self.details.is_none()
    }

    /// Build a profile from a sheet row, validating at this boundary.
    ///
    /// A row with an id and bridge message but no company name passes as a
    /// minimal listing. Anything else must fill every required column.
    pub fn from_row(headers: &[String], cells: &[String]) -> Result<Self> {
        let cell = |column: &str| -> &str {
            headers
                .iter()
                .position(|h| h == column)
                .and_then(|i| cells.get(i))
                .map(|c| c.trim())
                .unwrap_or_default()
        };

        let id = cell(columns::ID);
        let bridge_message = cell(columns::BRIDGE_MESSAGE);
        let company_image = match cell(columns::COMPANY_IMAGE) {
            "" => None,
            url => Some(url.to_string()),
        };

        if !id.is_empty() && !bridge_message.is_empty() && cell(columns::COMPANY).is_empty() {
            return Ok(Self {
                id: id.to_string(),
                bridge_message: bridge_message.to_string(),
                company_image,
                details: None,
            });
        }

        for column in REQUIRED_COLUMNS {
            if cell(column).is_empty() {
                return Err(Error::InvalidRecord {
                    company_id: id.to_string(),
                    field: (*column).to_string(),
                });
            }
        }

        Ok(Self {
            id: id.to_string(),
            bridge_message: bridge_message.to_string(),
            company_image,
            details: Some(CompanyDetails {
                company: cell(columns::COMPANY).to_string(),
                owner_driver: cell(columns::OWNER_DRIVER).to_string(),
                languages: vec![
                    cell(columns::LANGUAGES_A).to_string(),
                    cell(columns::LANGUAGES_B).to_string(),
                ],
                service_rates: vec![
                    cell(columns::RATE_I).to_string(),
                    cell(columns::RATE_II).to_string(),
                    cell(columns::RATE_III).to_string(),
                    cell(columns::RATE_IV).to_string(),
                ],
                vehicle_model: cell(columns::VEHICLE_MODEL).to_string(),
                licensed: cell(columns::LICENSED).to_string(),
                coverage: cell(columns::COVERAGE).to_string(),
                services: cell(columns::SERVICES).to_string(),
                custom_offers: cell(columns::CUSTOM_OFFERS).to_string(),
                availability: cell(columns::AVAILABILITY).to_string(),
                contact_method: cell(columns::CONTACT_METHOD).to_string(),
                thank_you_message: cell(columns::THANK_YOU_MESSAGE).to_string(),
            }),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// Headers and a filled row for a complete listing.
    pub(crate) fn full_fixture() -> (Vec<String>, Vec<String>) {
        let pairs = [
            (columns::ID, "acme-movers"),
            (columns::BRIDGE_MESSAGE, "MSF! Company Name: Acme Movers"),
            (columns::COMPANY_IMAGE, "https://img.example/acme.jpg"),
            (columns::COMPANY, "Acme Movers"),
            (columns::OWNER_DRIVER, "Ade"),
            (columns::LANGUAGES_A, "English"),
            (columns::LANGUAGES_B, "Yoruba"),
            (columns::RATE_I, "Mini move - 20k"),
            (columns::RATE_II, "Studio - 35k"),
            (columns::RATE_III, "2 bed - 50k"),
            (columns::RATE_IV, "Office - quote"),
            (columns::VEHICLE_MODEL, "Sienna 2014"),
            (columns::LICENSED, "Yes"),
            (columns::COVERAGE, "Lagos mainland"),
            (columns::SERVICES, "Packing, hauling"),
            (columns::CUSTOM_OFFERS, "Weekend discount"),
            (columns::AVAILABILITY, "Mon-Sat"),
            (columns::CONTACT_METHOD, "Chat here"),
            (columns::THANK_YOU_MESSAGE, "Thank you for choosing Acme!"),
        ];
        let headers = pairs.iter().map(|(h, _)| (*h).to_string()).collect();
        let cells = pairs.iter().map(|(_, c)| (*c).to_string()).collect();
        (headers, cells)
    }

    #[test]
    fn full_row_decodes() {
        let (headers, cells) = full_fixture();
        let profile = CompanyProfile::from_row(&headers, &cells).unwrap();
        assert_eq!(profile.id, "acme-movers");
        assert!(!profile.is_minimal());
        let details = profile.details.unwrap();
        assert_eq!(details.company, "Acme Movers");
        assert_eq!(details.languages, vec!["English", "Yoruba"]);
        assert_eq!(details.service_rates.len(), 4);
    }

    #[test]
    fn minimal_row_passes_without_details() {
        let headers = vec![
            columns::ID.to_string(),
            columns::BRIDGE_MESSAGE.to_string(),
            columns::COMPANY.to_string(),
        ];
        let cells = vec!["solo-van".to_string(), "MSF! Cost: 10k".to_string(), String::new()];
        let profile = CompanyProfile::from_row(&headers, &cells).unwrap();
        assert!(profile.is_minimal());
        assert_eq!(profile.bridge_message, "MSF! Cost: 10k");
        assert_eq!(profile.company_image, None);
    }

    #[test]
    fn named_company_with_gap_is_invalid() {
        let (headers, mut cells) = full_fixture();
        let idx = headers
            .iter()
            .position(|h| h == columns::VEHICLE_MODEL)
            .unwrap();
        cells[idx] = String::new();

        let err = CompanyProfile::from_row(&headers, &cells).unwrap_err();
        match err {
            Error::InvalidRecord { company_id, field } => {
                assert_eq!(company_id, "acme-movers");
                assert_eq!(field, columns::VEHICLE_MODEL);
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn short_rows_read_as_empty_cells() {
        let (headers, _) = full_fixture();
        let cells = vec!["acme-movers".to_string()];
        let err = CompanyProfile::from_row(&headers, &cells).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord { .. }));
    }

    #[test]
    fn cells_are_trimmed() {
        let headers = vec![
            columns::ID.to_string(),
            columns::BRIDGE_MESSAGE.to_string(),
            columns::COMPANY.to_string(),
        ];
        let cells = vec![
            " solo-van ".to_string(),
            "  MSF! Cost: 10k ".to_string(),
            "   ".to_string(),
        ];
        let profile = CompanyProfile::from_row(&headers, &cells).unwrap();
        assert_eq!(profile.id, "solo-van");
        assert_eq!(profile.bridge_message, "MSF! Cost: 10k");
        assert!(profile.is_minimal());
    }
}
