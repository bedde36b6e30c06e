//! Capability fan-out.
//!
//! Runs a callback against every enabled plugin of a capability and folds
//! the results into one [`ExecutionOutcome`].
//!
//! The reduction is last-successful-plugin-wins: when two enabled plugins
//! both return a value, the one registered later silently replaces the
//! earlier one. With several enabled database backends this means reads
//! come from the last one while writes go to all of them.

use futures::FutureExt;
use linkgator_common::{AppError, AppResult};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::capability::Capability;
use crate::error::{CapabilityExecutionError, PluginError};
use crate::plugin::Plugin;
use crate::registry::PluginRegistry;

/// Result of a capability fan-out.
#[derive(Debug)]
pub enum ExecutionOutcome<R> {
    /// No invocation failed. `None` if no plugin produced a value.
    Success(Option<R>),
    /// At least one invocation failed; partial successes are discarded.
    Failed(Vec<CapabilityExecutionError>),
}

impl<R> ExecutionOutcome<R> {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The value, if successful and present.
    pub fn value(self) -> Option<R> {
        match self {
            Self::Success(value) => value,
            Self::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn errors(&self) -> &[CapabilityExecutionError] {
        match self {
            Self::Success(_) => &[],
            Self::Failed(errors) => errors,
        }
    }

    pub fn into_result(self) -> Result<Option<R>, Vec<CapabilityExecutionError>> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failed(errors) => Err(errors),
        }
    }

    /// Convert to an HTTP-facing result, joining every failure message.
    pub fn into_app_result(self) -> AppResult<Option<R>> {
        self.into_result().map_err(|errors| {
            let message = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            AppError::Plugin(message)
        })
    }
}

/// Fans calls out over the plugins of a [`PluginRegistry`].
#[derive(Debug, Clone)]
pub struct PluginExecutor {
    registry: Arc<PluginRegistry>,
}

impl PluginExecutor {
    #[must_use]
    pub const fn new(registry: Arc<PluginRegistry>) -> Self {
        Self { registry }
    }

    #[must_use]
    pub const fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    /// Invoke `callback` on each enabled plugin of `capability`, in
    /// registration order.
    ///
    /// A callback that returns `Err` or panics is recorded and the next
    /// plugin still runs. `Ok(None)` contributes nothing.
    pub async fn execute_for_capability<R, F, Fut>(
        &self,
        capability: Capability,
        mut callback: F,
    ) -> ExecutionOutcome<R>
    where
        F: FnMut(Arc<dyn Plugin>) -> Fut,
        Fut: Future<Output = Result<Option<R>, PluginError>>,
    {
        let mut latest = None;
        let mut errors = Vec::new();

        for plugin in self.registry.get_by_capability(capability) {
            if !plugin.is_enabled() {
                debug!(plugin_id = %plugin.id(), %capability, "Skipping disabled plugin");
                continue;
            }

            let plugin_id = plugin.id().to_string();
            let result = AssertUnwindSafe(callback(plugin)).catch_unwind().await;

            match result {
                Ok(Ok(Some(value))) => latest = Some(value),
                Ok(Ok(None)) => {
                    debug!(plugin_id = %plugin_id, %capability, "Plugin returned no result");
                }
                Ok(Err(error)) => {
                    warn!(plugin_id = %plugin_id, %capability, error = %error, "Plugin call failed");
                    errors.push(CapabilityExecutionError { plugin_id, error });
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    warn!(plugin_id = %plugin_id, %capability, panic = %message, "Plugin call panicked");
                    errors.push(CapabilityExecutionError {
                        plugin_id,
                        error: PluginError::Panicked(message),
                    });
                }
            }
        }

        if errors.is_empty() {
            ExecutionOutcome::Success(latest)
        } else {
            ExecutionOutcome::Failed(errors)
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
