//! Sheet-backed directory over the Sheets values API.

use std::time::Duration;

use {async_trait::async_trait, serde::Deserialize, tracing::debug};

use crate::{
    error::{Error, Result},
    lookup::ProfileDirectory,
    profile::{CompanyProfile, columns},
};

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// `{ "values": [[...], ...] }` payload of a values-range read.
#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Directory reading a spreadsheet range of the form `Tab!A:Z`, first row
/// headers, one company per data row.
pub struct SheetDirectory {
    client: reqwest::Client,
    base_url: String,
    sheet_id: String,
    range: String,
    api_key: String,
}

impl SheetDirectory {
    pub fn new(
        sheet_id: impl Into<String>,
        range: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            sheet_id: sheet_id.into(),
            range: range.into(),
            api_key: api_key.into(),
        }
    }

    /// Point at a different API host. Tests aim this at a local mock.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_rows(&self) -> Result<Vec<Vec<String>>> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}?key={}",
            self.base_url,
            self.sheet_id,
            urlencoding::encode(&self.range),
            self.api_key,
        );
        let resp = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Error::Status {
                status: resp.status(),
            });
        }
        let body: ValuesResponse = resp.json().await?;
        Ok(body.values)
    }
}

#[async_trait]
impl ProfileDirectory for SheetDirectory {
    async fn lookup(&self, company_id: &str) -> Result<Option<CompanyProfile>> {
        let rows = self.fetch_rows().await?;
        let Some((headers, data)) = rows.split_first() else {
            debug!("sheet returned no rows");
            return Ok(None);
        };
        let id_index = headers
            .iter()
            .position(|h| h == columns::ID)
            .ok_or(Error::MissingHeader {
                header: columns::ID,
            })?;
        let Some(row) = data
            .iter()
            .find(|r| r.get(id_index).map(String::as_str) == Some(company_id))
        else {
            debug!(company_id, "company not found in sheet");
            return Ok(None);
        };
        CompanyProfile::from_row(headers, row).map(Some)
    }
}
