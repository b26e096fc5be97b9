use crate::core::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Source {
    #[default]
    Json,
    Yml,
}

const JSON_EXT: &str = "json";
const YML_EXT: &str = "yml";
const YAML_EXT: &str = "yaml";

impl std::str::FromStr for Source {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Source::Json),
            "yml" | "yaml" => Ok(Source::Yml),
            _ => Err(Error::UnsupportedConfigFormat(s.to_string())),
        }
    }
}

impl Source {
    /// Get the file extension for the given format
    pub fn ext(&self) -> &'static str {
        match self {
            Source::Json => JSON_EXT,
            Source::Yml => YML_EXT,
        }
    }

    /// Detect the config format from the file name
    pub fn detect(name: &str) -> Result<Source, Error> {
        let ext = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .ok_or_else(|| Error::UnsupportedConfigFormat(name.to_string()))?;

        match ext.as_str() {
            JSON_EXT => Ok(Source::Json),
            YML_EXT | YAML_EXT => Ok(Source::Yml),
            _ => Err(Error::UnsupportedConfigFormat(name.to_string())),
        }
    }
}
