//! Script Replay
//!
//! A script is a YAML (or JSON) list of calls, each made on behalf of a
//! principal, replayed in order against a [`Dispatcher`]:
//!
//! ```yaml
//! default-caller: alice
//! steps:
//!   - call: { function: register-ip, title: "Patent X", description: "...", expiration: 1900000000000 }
//!   - caller: bob
//!     call: { function: set-ip-status, id: 1, is-active: false }
//! ```

use crate::dispatch::{Call, Dispatcher, Outcome};
use crate::error::{Error, Result};
use crate::registry::Principal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// One call in a script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Principal making the call; falls back to the script default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller: Option<Principal>,
    pub call: Call,
}

/// An ordered batch of calls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Script {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_caller: Option<Principal>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Result of replaying a single step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// 1-based position in the script
    pub step: usize,
    pub caller: Principal,
    pub function: &'static str,
    pub outcome: Outcome,
}

impl Script {
    /// Load a script, picking the parser from the file extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let script: Script = if is_json {
            serde_json::from_str(&raw)?
        } else {
            serde_yaml::from_str(&raw)?
        };

        debug!(path = %path.display(), steps = script.steps.len(), "script loaded");
        Ok(script)
    }

    /// Replay every step in order.
    ///
    /// `fallback_caller` is used when neither the step nor the script names
    /// a caller. Call failures are reported in the step outcome; only a
    /// missing caller aborts the replay.
    pub fn run(
        &self,
        dispatcher: &Dispatcher,
        fallback_caller: Option<&Principal>,
    ) -> Result<Vec<StepReport>> {
        let mut reports = Vec::with_capacity(self.steps.len());

        for (idx, step) in self.steps.iter().enumerate() {
            let caller = step
                .caller
                .as_ref()
                .or(self.default_caller.as_ref())
                .or(fallback_caller)
                .ok_or_else(|| {
                    Error::Configuration(format!("step {} has no caller", idx + 1))
                })?;

            let outcome = dispatcher.call(caller, step.call.clone());
            reports.push(StepReport {
                step: idx + 1,
                caller: caller.clone(),
                function: step.call.function(),
                outcome,
            });
        }

        let failed = reports.iter().filter(|r| !r.outcome.is_success()).count();
        info!(steps = reports.len(), failed, "script replay complete");
        Ok(reports)
    }
}
