// public_url_utils.rs

use reqwest::Client;
use std::error::Error;

/// Represents a publicly viewable url to pull tabulated data from. The source datasets for a
/// linkage run typically live at raw CSV urls.
#[derive(Debug)]
pub struct PublicUrlConnectConfig {
    pub url: String,
    pub url_type: String, //  Options: RAW_CSV
}

/// Represents a PublicUrlConnect object
pub struct PublicUrlConnect;

/// Implements PublicUrlConnect
impl PublicUrlConnect {
    /// Fetches a publicly viewable raw CSV in one shot and returns its headers and rows. The
    /// datasets are small and static, so there is no retry policy.
    ///
    /// ```no_run
    /// use caselink::public_url_utils::{PublicUrlConnect, PublicUrlConnectConfig};
    /// use tokio::runtime::Runtime;
    ///
    /// let rt = Runtime::new().unwrap();
    /// rt.block_on(async {
    ///     let public_url_connect_config = PublicUrlConnectConfig {
    ///         url: "https://raw.githubusercontent.com/rfordatascience/tidytuesday/master/data/2023/2023-08-29/fair_use_findings.csv".to_string(),
    ///         url_type: "RAW_CSV".to_string(),
    ///     };
    ///
    ///     let result = PublicUrlConnect::get_raw_csv_data(public_url_connect_config).await;
    ///
    ///     match result {
    ///         Ok((headers, rows)) => {
    ///             assert!(!headers.is_empty(), "Expected non-empty headers");
    ///             assert!(!rows.is_empty(), "Expected non-empty rows");
    ///         }
    ///         Err(e) => {
    ///             panic!("Expected fetch to succeed but it failed: {}", e);
    ///         }
    ///     }
    /// });
    /// ```
    pub async fn get_raw_csv_data(
        public_url_connect_config: PublicUrlConnectConfig,
    ) -> Result<(Vec<String>, Vec<Vec<String>>), Box<dyn Error>> {
        if public_url_connect_config.url_type != "RAW_CSV" {
            return Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!(
                    "Unsupported url_type: {}",
                    public_url_connect_config.url_type
                ),
            )));
        }

        let client = Client::new();
        let response = client
            .get(&public_url_connect_config.url)
            .send()
            .await
            .map_err(|e| Box::new(e) as Box<dyn Error>)?;

        if !response.status().is_success() {
            return Err(Box::new(response.error_for_status().unwrap_err()) as Box<dyn Error>);
        }

        let body = response
            .text()
            .await
            .map_err(|e| Box::new(e) as Box<dyn Error>)?;

        let mut rdr = csv::Reader::from_reader(body.as_bytes());

        let headers: Vec<String> = rdr.headers()?.iter().map(String::from).collect();

        let mut rows: Vec<Vec<String>> = Vec::new();
        for result in rdr.records() {
            let record = result?;
            rows.push(record.iter().map(String::from).collect());
        }

        Ok((headers, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::runtime::Runtime;

    #[test]
    fn rejects_unknown_url_type() {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let config = PublicUrlConnectConfig {
                url: "https://example.com/data.csv".to_string(),
                url_type: "GOOGLE_SHEETS".to_string(),
            };

            let result = PublicUrlConnect::get_raw_csv_data(config).await;
            assert!(result.is_err());
            assert!(result
                .unwrap_err()
                .to_string()
                .contains("Unsupported url_type"));
        });
    }
}
