//! Naming configuration for ingestion field generation

use serde::{Deserialize, Serialize};

/// How nested path segments are joined into a column name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingConvention {
    /// `a.b.c`, used by column-store dimension specs
    #[default]
    Dotted,
    /// `a_b_c`, used by lakehouse column specs
    Underscored,
}

impl NamingConvention {
    /// Separator placed between path segments
    pub fn separator(&self) -> &'static str {
        match self {
            NamingConvention::Dotted => ".",
            NamingConvention::Underscored => "_",
        }
    }

    /// Join path segments into a column name
    pub fn join<S: AsRef<str>>(&self, segments: &[S]) -> String {
        segments
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(self.separator())
    }
}

impl std::fmt::Display for NamingConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NamingConvention::Dotted => write!(f, "dotted"),
            NamingConvention::Underscored => write!(f, "underscored"),
        }
    }
}

impl std::str::FromStr for NamingConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dotted" | "dot" | "druid" => Ok(NamingConvention::Dotted),
            "underscored" | "underscore" | "hudi" | "lakehouse" => {
                Ok(NamingConvention::Underscored)
            }
            _ => Err(format!("Unknown naming convention: {}", s)),
        }
    }
}
