//! Client configuration, read from the process environment.
//!
//! A `.env` file in the working directory is loaded first when there is one.
//! Variables already set in the environment win over the file.
//!
//! | variable | default |
//! |---|---|
//! | `DYNAMO_ACCESS_KEY` | required |
//! | `DYNAMO_SECRET_KEY` | required |
//! | `DYNAMO_REGION` | `ap-southeast-2` |
//! | `DYNAMO_ENDPOINT` | none |
//! | `DYNAMO_POLL_INTERVAL_MS` | `1000` |
//! | `DYNAMO_LIFECYCLE_TIMEOUT_SECS` | `120` |
//! | `DYNAMO_INDEX_SETTLE_MS` | `1000` |

use std::{fmt::Debug, str::FromStr, time::Duration};

use log::debug;

use crate::error::{Error, Result};
use crate::lifecycle::WaitOptions;

pub const ACCESS_KEY_VAR: &str = "DYNAMO_ACCESS_KEY";
pub const SECRET_KEY_VAR: &str = "DYNAMO_SECRET_KEY";
pub const REGION_VAR: &str = "DYNAMO_REGION";
pub const ENDPOINT_VAR: &str = "DYNAMO_ENDPOINT";
pub const POLL_INTERVAL_VAR: &str = "DYNAMO_POLL_INTERVAL_MS";
pub const LIFECYCLE_TIMEOUT_VAR: &str = "DYNAMO_LIFECYCLE_TIMEOUT_SECS";
pub const INDEX_SETTLE_VAR: &str = "DYNAMO_INDEX_SETTLE_MS";

pub const DEFAULT_REGION: &str = "ap-southeast-2";

const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
const DEFAULT_LIFECYCLE_TIMEOUT_SECS: u64 = 120;
const DEFAULT_INDEX_SETTLE_MS: u64 = 1000;

#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub poll_interval: Duration,
    pub lifecycle_timeout: Duration,
    /// How long to wait after writing before querying a secondary index.
    pub index_settle_delay: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Result<ClientConfig> {
        //! Load `.env` if present, then read the process environment.
        //!
        //! Fails fast with [`Error::MissingCredential`] when either key is
        //! unset, and with [`Error::InvalidConfig`] on a malformed number.

        match dotenvy::dotenv() {
            Ok(path) => debug!("loaded environment from {}", path.display()),
            Err(error) if error.not_found() => debug!("no .env file found"),
            Err(error) => debug!("ignoring .env file: {}", error),
        }

        ClientConfig::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        //! Build a configuration from any variable source. Blank values count
        //! as unset.

        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let credential = |name: &str| {
            read(name).ok_or_else(|| Error::MissingCredential {
                variable: name.to_string(),
            })
        };

        let number = |name: &str, default: u64| -> Result<u64> {
            match read(name) {
                Some(value) => parse(name, &value),
                None => Ok(default),
            }
        };

        Ok(ClientConfig {
            access_key: credential(ACCESS_KEY_VAR)?,
            secret_key: credential(SECRET_KEY_VAR)?,
            region: read(REGION_VAR).unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint: read(ENDPOINT_VAR),
            poll_interval: Duration::from_millis(number(POLL_INTERVAL_VAR, DEFAULT_POLL_INTERVAL_MS)?),
            lifecycle_timeout: Duration::from_secs(number(
                LIFECYCLE_TIMEOUT_VAR,
                DEFAULT_LIFECYCLE_TIMEOUT_SECS,
            )?),
            index_settle_delay: Duration::from_millis(number(INDEX_SETTLE_VAR, DEFAULT_INDEX_SETTLE_MS)?),
        })
    }

    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions::new(self.poll_interval, self.lifecycle_timeout)
    }
}

impl Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("poll_interval", &self.poll_interval)
            .field("lifecycle_timeout", &self.lifecycle_timeout)
            .field("index_settle_delay", &self.index_settle_delay)
            .finish()
    }
}

fn parse<N: FromStr>(name: &str, value: &str) -> Result<N> {
    value.trim().parse::<N>().map_err(|_| Error::InvalidConfig {
        variable: name.to_string(),
        value: value.to_string(),
    })
}
