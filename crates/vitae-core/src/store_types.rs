use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Keyed store backend types
///
/// Lives in core because configuration selects it; the implementations are in
/// `vitae-storage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Single-file SQLite database; supports multi-key transactions.
    #[default]
    Sqlite,
    /// Directory tree (bucket = directory, key = file). No transactions.
    Fs,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "fs" | "filesystem" => Ok(StoreBackend::Fs),
            _ => Err(anyhow::anyhow!("Invalid store backend: {}", s)),
        }
    }
}

impl Display for StoreBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StoreBackend::Sqlite => write!(f, "sqlite"),
            StoreBackend::Fs => write!(f, "fs"),
        }
    }
}
