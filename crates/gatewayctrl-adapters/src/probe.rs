// crates/gatewayctrl-adapters/src/probe.rs
// ============================================================================
// Module: Gateway Probe
// Description: Deadline-bounded connection tests across many gateways.
// Purpose: Let one slow gateway never stall an aggregate health view.
// Dependencies: gatewayctrl-core
// ============================================================================

//! ## Overview
//! [`probe_gateways`] runs `test_connection` for every config on its own
//! thread and waits on a channel until all answers arrive or the deadline
//! passes. Calls still running at the deadline are abandoned and reported as
//! [`ProbeOutcome::TimedOut`]; their threads finish on their own once the
//! per-request timeout fires and their late answers are dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use gatewayctrl_core::ConnectionTestResult;
use gatewayctrl_core::GatewayConfig;
use gatewayctrl_core::GatewayError;

use crate::factory::AdapterFactory;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Result of probing one gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// The connection test finished.
    Completed(ConnectionTestResult),
    /// No adapter could be built for the config.
    Rejected(GatewayError),
    /// The deadline passed first.
    TimedOut,
}

impl ProbeOutcome {
    /// Returns a stable label for display.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Completed(result) => result.as_str(),
            Self::Rejected(err) => err.kind(),
            Self::TimedOut => "timed_out",
        }
    }
}

/// Probe report for one config, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    /// Gateway display name.
    pub gateway_name: String,
    /// Vendor key.
    pub gateway_type: String,
    /// Outcome.
    pub outcome: ProbeOutcome,
    /// Time until the answer arrived, or the deadline.
    pub elapsed: Duration,
}

// ============================================================================
// SECTION: Probe
// ============================================================================

/// Tests every config concurrently and returns one report per config.
#[must_use]
pub fn probe_gateways(
    factory: &Arc<AdapterFactory>,
    configs: &[GatewayConfig],
    deadline: Duration,
) -> Vec<ProbeReport> {
    let started = Instant::now();
    let (sender, receiver) = mpsc::channel::<(usize, ProbeOutcome, Duration)>();
    let mut outcomes: Vec<Option<(ProbeOutcome, Duration)>> = vec![None; configs.len()];

    for (index, config) in configs.iter().enumerate() {
        let factory = Arc::clone(factory);
        let config = config.clone();
        let sender = sender.clone();
        let spawned = thread::Builder::new().name(format!("probe-{index}")).spawn(move || {
            let outcome = match factory.create(&config) {
                Ok(adapter) => ProbeOutcome::Completed(adapter.test_connection()),
                Err(err) => ProbeOutcome::Rejected(err),
            };
            let _ = sender.send((index, outcome, started.elapsed()));
        });
        if let Err(err) = spawned {
            outcomes[index] = Some((
                ProbeOutcome::Rejected(GatewayError::unexpected(format!(
                    "probe thread could not start: {err}"
                ))),
                started.elapsed(),
            ));
        }
    }
    drop(sender);

    let limit = started + deadline;
    while outcomes.iter().any(Option::is_none) {
        let remaining = limit.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        match receiver.recv_timeout(remaining) {
            Ok((index, outcome, elapsed)) => {
                if let Some(slot) = outcomes.get_mut(index) {
                    *slot = Some((outcome, elapsed));
                }
            }
            Err(_) => break,
        }
    }

    configs
        .iter()
        .zip(outcomes)
        .map(|(config, outcome)| {
            let (outcome, elapsed) = outcome.unwrap_or((ProbeOutcome::TimedOut, deadline));
            ProbeReport {
                gateway_name: config.name.clone(),
                gateway_type: config.gateway_type.to_string(),
                outcome,
                elapsed,
            }
        })
        .collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use gatewayctrl_core::ApiId;
    use gatewayctrl_core::ApiPage;
    use gatewayctrl_core::ApiSpec;
    use gatewayctrl_core::ApiStream;
    use gatewayctrl_core::GatewayAdapter;
    use gatewayctrl_core::GatewayType;
    use gatewayctrl_core::HttpSettings;
    use gatewayctrl_core::NoopAuditSink;
    use gatewayctrl_core::NormalizedApi;

    use super::*;

    /// Adapter whose probe sleeps before succeeding.
    struct Sleepy {
        /// Registry key.
        gateway_type: GatewayType,
        /// Probe delay.
        delay: Duration,
    }

    impl GatewayAdapter for Sleepy {
        fn gateway_type(&self) -> &GatewayType {
            &self.gateway_type
        }

        fn check_connection(&self) -> Result<(), GatewayError> {
            thread::sleep(self.delay);
            Ok(())
        }

        fn list_apis(&self) -> ApiStream<'_> {
            ApiStream::from_fn(|_| Ok(ApiPage::last(Vec::new())), 1)
        }

        fn create_api(&self, _spec: &ApiSpec) -> Result<NormalizedApi, GatewayError> {
            Err(GatewayError::UnsupportedOperation("sleepy".to_string()))
        }

        fn update_api(&self, _id: &ApiId, _spec: &ApiSpec) -> Result<NormalizedApi, GatewayError> {
            Err(GatewayError::UnsupportedOperation("sleepy".to_string()))
        }

        fn delete_api(&self, _id: &ApiId) -> Result<(), GatewayError> {
            Err(GatewayError::UnsupportedOperation("sleepy".to_string()))
        }
    }

    fn factory() -> Arc<AdapterFactory> {
        let mut factory = AdapterFactory::new(HttpSettings::default(), Arc::new(NoopAuditSink));
        for (key, delay) in [("fast", Duration::from_millis(1)), ("slow", Duration::from_secs(5))] {
            factory.register_adapter(key, move |_, _| {
                Ok(Box::new(Sleepy {
                    gateway_type: GatewayType::new(key),
                    delay,
                }))
            });
        }
        Arc::new(factory)
    }

    #[test]
    fn slow_gateways_time_out_without_blocking_others() {
        let configs = vec![
            GatewayConfig::new("a", "fast", ""),
            GatewayConfig::new("b", "slow", ""),
            GatewayConfig::new("c", "missing", ""),
        ];
        let started = Instant::now();
        let reports = probe_gateways(&factory(), &configs, Duration::from_millis(300));
        assert!(started.elapsed() < Duration::from_secs(4));
        assert_eq!(reports[0].outcome, ProbeOutcome::Completed(ConnectionTestResult::Success));
        assert_eq!(reports[1].outcome, ProbeOutcome::TimedOut);
        assert_eq!(reports[2].outcome.label(), "unknown_gateway_type");
        assert_eq!(reports[1].gateway_name, "b");
    }
}
