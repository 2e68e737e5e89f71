use crate::error::{BadEnvVarSnafu, ParseEnvVarSnafu, RollcallResult};
use dotenvy::var;
use snafu::ResultExt;
use std::{env::VarError, path::PathBuf};

const DEFAULT_SERVER_IP: &str = "127.0.0.1:4000";
const DEFAULT_DATA_PATH: &str = "data/students.json";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    server_ip: String,
    data_path: PathBuf,
    email_domain: Option<String>,
    max_upload_bytes: usize,
}

impl RuntimeConfiguration {
    pub fn new() -> RollcallResult<Self> {
        let max_upload_bytes = match get_optional_env_var("ROLLCALL_MAX_UPLOAD_BYTES")? {
            Some(raw) => raw.parse().context(ParseEnvVarSnafu {
                name: "ROLLCALL_MAX_UPLOAD_BYTES",
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            server_ip: get_optional_env_var("ROLLCALL_SERVER_IP")?
                .unwrap_or_else(|| DEFAULT_SERVER_IP.to_string()),
            data_path: get_optional_env_var("ROLLCALL_DATA_PATH")?
                .map_or_else(|| PathBuf::from(DEFAULT_DATA_PATH), PathBuf::from),
            email_domain: get_optional_env_var("ROLLCALL_EMAIL_DOMAIN")?,
            max_upload_bytes,
        })
    }

    #[cfg(test)]
    pub fn for_data_path(data_path: impl Into<PathBuf>, email_domain: Option<&str>) -> Self {
        Self {
            server_ip: DEFAULT_SERVER_IP.to_string(),
            data_path: data_path.into(),
            email_domain: email_domain.map(ToString::to_string),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn server_ip(&self) -> &str {
        &self.server_ip
    }

    pub fn data_path(&self) -> PathBuf {
        self.data_path.clone()
    }

    pub fn email_domain(&self) -> Option<String> {
        self.email_domain.clone()
    }

    pub const fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }
}

///blank counts as unset
fn get_optional_env_var(name: &'static str) -> RollcallResult<Option<String>> {
    match var(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value.trim().to_string())),
        Err(dotenvy::Error::EnvVar(VarError::NotPresent)) => Ok(None),
        Err(e) => Err(e).context(BadEnvVarSnafu { name }),
    }
}
