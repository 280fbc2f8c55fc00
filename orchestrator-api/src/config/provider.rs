use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, fs};

use displaydoc::Display;
use thiserror::Error;
use toml::{Table, Value};
use tracing::debug;

const SECRETS_ROOT: &str = "SECRETS_ROOT";

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Display, Error)]
pub enum Error {
    /// Secret file is empty: {0}
    EmptyFile(PathBuf),
    /// Environment variable is empty: {0}
    EmptyVar(String),
    /// Failed to read metadata for file `{0}`: {1}
    FileMeta(PathBuf, std::io::Error),
    /// Config source directory does not exist: {0}
    NoSourceDir(PathBuf),
    /// Failed to parse secret file `{0}`: {1}
    ParseFile(PathBuf, BoxError),
    /// Failed to parse toml entry `{0}`: {1}
    ParseToml(&'static str, BoxError),
    /// Failed to parse environment variable `{0}`: {1}
    ParseVar(String, BoxError),
    /// Failed to read file `{0}`: {1}
    ReadFile(PathBuf, std::io::Error),
    /// Failed to read toml `{0}`: {1}
    ReadToml(PathBuf, std::io::Error),
    /// Failed to parse toml table: {0}
    TomlTable(toml::de::Error),
}

/// Provider resolves config values from the environment.
///
/// Sources are checked in order: a file named after the variable under
/// `SECRETS_ROOT`, then the environment variable itself, then the dotted entry
/// in the toml table. The first source holding a value wins.
pub struct Provider {
    secrets_root: Option<PathBuf>,
    toml_table: Option<Table>,
}

impl Provider {
    pub fn new<P: AsRef<Path>>(toml: Option<P>) -> Result<Self, Error> {
        let secrets_root = match env::var(SECRETS_ROOT) {
            Ok(root) => {
                debug!("Reading secrets from `{SECRETS_ROOT}` directory: {root}");
                Some(Self::secrets_root(root)?)
            }
            Err(_) => None,
        };

        let toml_table = match toml {
            Some(file) => {
                debug!("Reading config from file: {:?}", file.as_ref());
                Some(Self::toml_table(file)?)
            }
            None => {
                debug!("No config file, using environment and defaults.");
                None
            }
        };

        Ok(Provider {
            secrets_root,
            toml_table,
        })
    }

    fn secrets_root<P: AsRef<Path>>(path: P) -> Result<PathBuf, Error> {
        let path = path.as_ref().to_path_buf();
        if path.is_dir() {
            Ok(path)
        } else {
            Err(Error::NoSourceDir(path))
        }
    }

    fn toml_table<P: AsRef<Path>>(toml: P) -> Result<Table, Error> {
        let toml = toml.as_ref();
        let text = fs::read_to_string(toml).map_err(|err| Error::ReadToml(toml.into(), err))?;
        toml::from_str(&text).map_err(Error::TomlTable)
    }

    /// Parse the config value named by `var` or `entry`, falling back to
    /// `default` when no source holds one.
    pub fn read_or<S, T, E>(&self, default: S, var: &str, entry: &'static str) -> Result<T, Error>
    where
        S: Into<T>,
        T: FromStr<Err = E>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Ok(self.lookup(var, entry)?.unwrap_or_else(|| default.into()))
    }

    fn lookup<T, E>(&self, var: &str, entry: &'static str) -> Result<Option<T>, Error>
    where
        T: FromStr<Err = E>,
        E: std::error::Error + Send + Sync + 'static,
    {
        if let Some(value) = self.read_file(var)? {
            return Ok(Some(value));
        }
        if let Some(value) = Self::read_var(var)? {
            return Ok(Some(value));
        }
        self.read_toml(entry)
    }

    fn read_file<T, E>(&self, var: &str) -> Result<Option<T>, Error>
    where
        T: FromStr<Err = E>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let Some(root) = &self.secrets_root else {
            return Ok(None);
        };
        let file = root.join(var);

        match fs::metadata(&file) {
            Ok(meta) if meta.len() == 0 => return Err(Error::EmptyFile(file)),
            Ok(_) => (),
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(Error::FileMeta(file, err)),
        }

        let text = fs::read_to_string(&file).map_err(|err| Error::ReadFile(file.clone(), err))?;
        text.trim()
            .parse()
            .map(Some)
            .map_err(|err| Error::ParseFile(file, Box::new(err)))
    }

    fn read_var<T, E>(var: &str) -> Result<Option<T>, Error>
    where
        T: FromStr<Err = E>,
        E: std::error::Error + Send + Sync + 'static,
    {
        match env::var(var) {
            Ok(val) if val.is_empty() => Err(Error::EmptyVar(var.into())),
            Ok(val) => val
                .parse()
                .map(Some)
                .map_err(|err| Error::ParseVar(var.into(), Box::new(err))),
            Err(_) => Ok(None),
        }
    }

    fn read_toml<T, E>(&self, entry: &'static str) -> Result<Option<T>, Error>
    where
        T: FromStr<Err = E>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let Some(mut table) = self.toml_table.as_ref() else {
            return Ok(None);
        };

        let mut path = entry.split('.').peekable();
        while let Some(key) = path.next() {
            let value = match table.get(key) {
                Some(Value::Table(inner)) if path.peek().is_some() => {
                    table = inner;
                    continue;
                }
                Some(Value::String(s)) if path.peek().is_none() => s.clone(),
                Some(val) if path.peek().is_none() => val.to_string(),
                _ => return Ok(None),
            };

            return value
                .parse()
                .map(Some)
                .map_err(|err| Error::ParseToml(entry, Box::new(err)));
        }

        Ok(None)
    }
}
