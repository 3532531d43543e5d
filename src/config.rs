use std::env;

use anyhow::Context;
use anyhow::bail;

/// Level of the world the benchmark generates, the same as the original `generate-16384`.
pub const DEFAULT_LEVEL: u32 = 16384;

/// Stack of the evaluation thread, in MiB. `Cell::result` recurses once per level.
pub const DEFAULT_STACK_MB: usize = 512;

const LEVEL_VAR: &str = "HLIFE_LEVEL";
const STACK_VAR: &str = "HLIFE_STACK_MB";

/// Settings of the `hlife` benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// The world is `2^level` cells on a side
    pub level: u32,

    /// Stack size of the evaluation thread, in MiB
    pub stack_mb: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            stack_mb: DEFAULT_STACK_MB,
        }
    }
}

impl Config {
    /// Resolve the configuration from command line arguments (without the program name), then
    /// the environment, then defaults.
    pub fn load<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        Self::resolve(args, |key| env::var(key).ok())
    }

    fn resolve<I, F>(args: I, var: F) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        let mut args = args.into_iter();

        let level = match args.next() {
            Some(arg) => Some((arg, "argument")),
            None => var(LEVEL_VAR).map(|v| (v, LEVEL_VAR)),
        };

        if let Some((level, source)) = level {
            config.level = level
                .trim()
                .parse()
                .with_context(|| format!("Invalid level {level:?} from {source}"))?;
        }

        if let Some(extra) = args.next() {
            bail!("Unexpected argument {extra:?}, usage: hlife [LEVEL]");
        }

        if let Some(stack) = var(STACK_VAR) {
            config.stack_mb = stack
                .trim()
                .parse()
                .with_context(|| format!("Invalid stack size {stack:?} from {STACK_VAR}"))?;
        }

        if config.level < 2 {
            bail!("Level must be at least 2, got {}", config.level);
        }

        if config.stack_mb == 0 {
            bail!("{STACK_VAR} must be positive");
        }

        if config.stack_mb.checked_mul(1 << 20).is_none() {
            bail!("{STACK_VAR} of {} MiB does not fit in memory", config.stack_mb);
        }

        Ok(config)
    }

    /// Stack size of the evaluation thread, in bytes.
    pub fn stack_size(&self) -> usize {
        self.stack_mb << 20
    }
}
