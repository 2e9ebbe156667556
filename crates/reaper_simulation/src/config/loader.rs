//! Загрузка `LocomotionTuning` из RON.

use ron::Options;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use super::LocomotionTuning;

/// Ошибка загрузки/валидации tuning файла
#[derive(Debug)]
pub enum ConfigError {
    /// Файл не читается
    Io { file: String, source: std::io::Error },
    /// RON не парсится
    Parse { file: String, message: String },
    /// Значение вне допустимого диапазона
    Invalid { field: &'static str, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, message: String) -> Self {
        Self::Invalid { field, message }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { file, source } => write!(f, "failed to read {file}: {source}"),
            Self::Parse { file, message } => write!(f, "failed to parse {file}: {message}"),
            Self::Invalid { field, message } => write!(f, "invalid tuning value {field}: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// RON options: `IMPLICIT_SOME` чтобы писать `max_pull_time: 3.0` вместо `Some(3.0)`
fn ron_options() -> Options {
    Options::default().with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
}

impl LocomotionTuning {
    /// Прочитать и провалидировать tuning файл
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            file: file.clone(),
            source,
        })?;

        Self::parse(&contents, &file)
    }

    /// Распарсить RON строку (для тестов и embedded defaults)
    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        Self::parse(contents, "<inline>")
    }

    fn parse(contents: &str, file: &str) -> Result<Self, ConfigError> {
        let tuning: LocomotionTuning =
            ron_options()
                .from_str(contents)
                .map_err(|e| ConfigError::Parse {
                    file: file.to_string(),
                    message: e.to_string(),
                })?;

        tuning.validate()?;
        Ok(tuning)
    }

    /// Сериализовать в RON (для dump текущих значений)
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()).map_err(|e| {
            ConfigError::Parse {
                file: "<serialize>".to_string(),
                message: e.to_string(),
            }
        })
    }
}
