use serde::Serialize;

/// Settings given on the command line; they take precedence over every file
/// and environment source. Unset fields leave lower layers untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
}

impl CliOverrides {
    pub fn is_empty(&self) -> bool {
        self.concurrency.is_none()
    }
}
