use crate::error::{ParseUuidSnafu, RollcallResult};
use serde::Deserialize;
use snafu::ResultExt;
use uuid::Uuid;

pub mod store;
pub mod student;
pub mod validation;

#[derive(Deserialize, Default)]
pub struct OptionalIdForm {
    pub id: Option<Uuid>,
}

/// Path ids come in as text so a malformed one becomes our own 400 rather than axum's rejection.
pub fn parse_id(raw: &str) -> RollcallResult<Uuid> {
    Uuid::parse_str(raw.trim()).context(ParseUuidSnafu { original: raw })
}
