use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Argument vector of a command run inside the service container.
///
/// Deserializes from either a YAML list or a single string, which is split
/// with shell quoting rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine(Vec<String>);

impl CommandLine {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(args.into_iter().map(Into::into).collect())
    }

    /// Split a shell-style command string into words.
    pub fn parse(line: &str) -> Result<Self, shell_words::ParseError> {
        shell_words::split(line).map(Self)
    }

    pub fn args(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&shell_words::join(&self.0))
    }
}

impl Serialize for CommandLine {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CommandLine {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CommandVisitor;

        impl<'de> Visitor<'de> for CommandVisitor {
            type Value = CommandLine;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a command string or a list of arguments")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<CommandLine, E> {
                let cmd = CommandLine::parse(value)
                    .map_err(|e| E::custom(format!("invalid command {value:?}: {e}")))?;
                if cmd.is_empty() {
                    return Err(E::custom("command must not be empty"));
                }
                Ok(cmd)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<CommandLine, A::Error> {
                let mut args = Vec::new();
                while let Some(arg) = seq.next_element::<String>()? {
                    args.push(arg);
                }
                if args.is_empty() {
                    return Err(de::Error::custom("command must not be empty"));
                }
                Ok(CommandLine(args))
            }
        }

        deserializer.deserialize_any(CommandVisitor)
    }
}

/// A named command whose exit code is classified into pass, warn or fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    pub name: String,
    pub command: CommandLine,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub warn_only: bool,
}

impl Check {
    pub fn new(name: impl Into<String>, command: CommandLine) -> Self {
        Self {
            name: name.into(),
            command,
            env: BTreeMap::new(),
            warn_only: false,
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn warn_only(mut self, warn_only: bool) -> Self {
        self.warn_only = warn_only;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Display name used in banners.
    pub project: String,
    /// Compose manifest, relative to the project root.
    pub manifest: PathBuf,
    /// Service the controller resolves for exec and checks.
    pub service: String,
    /// Working directory for checks inside the container.
    pub workdir: String,
    /// Docker CLI binary.
    pub docker: String,
    /// Dependency install step, run by `run` and first by `ci`.
    pub install: Option<Check>,
    pub checks: Vec<Check>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: "runopencode/query-resources-loader-bundle".to_string(),
            manifest: PathBuf::from("docker-compose.yaml"),
            service: "php.local".to_string(),
            workdir: "/var/www/html".to_string(),
            docker: "docker".to_string(),
            install: Some(
                Check::new("composer install", CommandLine::new(["composer", "install"]))
                    .with_env("XDEBUG_MODE", "off"),
            ),
            checks: default_checks(),
        }
    }
}

fn default_checks() -> Vec<Check> {
    let composer_run = |script: &str| {
        Check::new(
            format!("composer run {script}"),
            CommandLine::new(["composer", "run", script]),
        )
    };

    vec![
        composer_run("phpunit").with_env("XDEBUG_MODE", "coverage"),
        composer_run("php-cs-fixer"),
        composer_run("phpmd"),
        composer_run("phpstan"),
        composer_run("psalm"),
        composer_run("composer-require-checker"),
        composer_run("composer-unused"),
    ]
}

impl Config {
    /// Checks for a CI run, with the install step first when requested.
    pub fn ci_checks(&self, install: bool) -> Vec<Check> {
        let mut checks = Vec::with_capacity(self.checks.len() + 1);
        if install && let Some(step) = &self.install {
            checks.push(step.clone());
        }
        checks.extend(self.checks.iter().cloned());
        checks
    }
}
