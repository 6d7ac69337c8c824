use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EnginesConfig {
    /// The program wrapping Federation v1 composition and query planning.
    #[serde(default = "default_fed1_engine")]
    pub fed1: EngineCommandConfig,

    /// The program wrapping Federation v2 composition and query planning.
    #[serde(default = "default_fed2_engine")]
    pub fed2: EngineCommandConfig,
}

/// An external program speaking the engine protocol on stdin/stdout.
///
/// `compose` or `plan` is appended to `args` for each call. The program runs
/// in the directory of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EngineCommandConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for EnginesConfig {
    fn default() -> Self {
        EnginesConfig {
            fed1: default_fed1_engine(),
            fed2: default_fed2_engine(),
        }
    }
}

fn default_fed1_engine() -> EngineCommandConfig {
    EngineCommandConfig {
        command: "node".to_string(),
        args: vec!["engines/fed1.mjs".to_string()],
    }
}

fn default_fed2_engine() -> EngineCommandConfig {
    EngineCommandConfig {
        command: "node".to_string(),
        args: vec!["engines/fed2.mjs".to_string()],
    }
}
