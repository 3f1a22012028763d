//! One monitoring pass: oracle gate, ratio checks, redemption scan and
//! change tracking, in that order.

use crate::datasource::{ChainClients, ChainError};
use crate::db::{SnapshotStore, StoreError};
use crate::domain::{Address, AlertEvent, Decimal, Position, PriceReading};
use crate::engine::policy::{self, Thresholds};
use crate::engine::{
    collateral_ratio, redemption_exposure, validate_oracle, ChangeResult, CollateralRatio,
    OracleError, RatioError, RedemptionExposure, StateTracker,
};
use crate::error::MonitorError;
use crate::notify::Notifier;
use crate::Config;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Steps of a run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStage {
    Init,
    ValidateOracle,
    FetchPrice,
    ComputeRatio,
    EvaluateRatio,
    FetchPositions,
    ComputeExposure,
    EvaluateExposure,
    TrackState,
    Done,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What a completed run observed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub price: Decimal,
    pub ratio: Option<CollateralRatio>,
    /// The registry's own ratio for comparison; never used for decisions.
    pub registry_ratio: Option<Decimal>,
    /// ETH ahead in redemption order, when the scan completed.
    pub exposure: Option<Decimal>,
    pub change: Option<ChangeResult>,
    pub alerts_sent: usize,
    pub alerts_failed: usize,
    pub persistence_failed: bool,
}

#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunReport),
    /// The run stopped at `stage`; alerts sent before that stage stand.
    Aborted {
        stage: RunStage,
        error: MonitorError,
        alerts_sent: usize,
    },
}

/// Settings the run needs from the configuration.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub position: Address,
    pub thresholds: Thresholds,
    pub expected_oracle_decimals: u32,
}

impl From<&Config> for MonitorSettings {
    fn from(config: &Config) -> Self {
        Self {
            position: config.position.clone(),
            thresholds: config.thresholds(),
            expected_oracle_decimals: config.expected_oracle_decimals,
        }
    }
}

/// Evaluates one trove against its thresholds.
#[derive(Debug, Clone)]
pub struct Monitor {
    settings: MonitorSettings,
    chain: ChainClients,
    store: Arc<dyn SnapshotStore>,
    notifier: Arc<dyn Notifier>,
}

impl Monitor {
    pub fn new(
        settings: MonitorSettings,
        chain: ChainClients,
        store: Arc<dyn SnapshotStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            settings,
            chain,
            store,
            notifier,
        }
    }

    /// Run every check once. `force_notify` also sends a health summary.
    pub async fn run_once(&self, force_notify: bool) -> RunOutcome {
        enter(RunStage::Init);
        info!(position = %self.settings.position, "Starting trove health check");
        let mut report = RunReport::default();

        macro_rules! abort {
            ($stage:expr, $err:expr) => {{
                let error: MonitorError = $err;
                error!(stage = %$stage, error = %error, "Trove health check aborted");
                return RunOutcome::Aborted {
                    stage: $stage,
                    error,
                    alerts_sent: report.alerts_sent,
                };
            }};
        }

        enter(RunStage::ValidateOracle);
        let decimals = match self.check_oracle().await {
            Ok(decimals) => decimals,
            Err(e) => abort!(RunStage::ValidateOracle, e.into()),
        };

        enter(RunStage::FetchPrice);
        let answer = match self.chain.oracle.latest_price().await {
            Ok(answer) => answer,
            Err(e) => abort!(RunStage::FetchPrice, MonitorError::PriceUnavailable(e)),
        };
        let price = PriceReading::new(answer, decimals);
        report.price = match price.value() {
            Ok(value) => value,
            Err(e) => abort!(
                RunStage::FetchPrice,
                MonitorError::PriceUnavailable(ChainError::ParseError(e.to_string()))
            ),
        };
        info!(price = %report.price, "ETH price");

        enter(RunStage::ComputeRatio);
        let (debt, collateral) = match self.chain.registry.position(&self.settings.position).await
        {
            Ok(amounts) => amounts,
            Err(e) => abort!(
                RunStage::ComputeRatio,
                MonitorError::PositionDataUnavailable(e)
            ),
        };
        let ratio = match collateral_ratio(debt, collateral, &price) {
            Ok(ratio) => ratio,
            Err(e) => {
                warn!(debt = %debt, collateral = %collateral, "Cannot compute collateral ratio");
                abort!(RunStage::ComputeRatio, e.into())
            }
        };
        report.ratio = Some(ratio);
        report.registry_ratio = self.registry_ratio(&price).await;
        info!(ratio = %ratio, "Trove collateral ratio");

        enter(RunStage::EvaluateRatio);
        if force_notify {
            let summary = policy::health_summary(report.price, ratio);
            self.dispatch(&mut report, vec![summary]).await;
        }
        self.dispatch(&mut report, policy::ratio_alerts(ratio, &self.settings.thresholds))
            .await;

        enter(RunStage::FetchPositions);
        let count = match self.chain.registry.position_count().await {
            Ok(count) => count,
            Err(e) => abort!(
                RunStage::FetchPositions,
                MonitorError::PositionDataUnavailable(e)
            ),
        };
        debug!(count, "Trove count");
        let positions = match self.chain.positions.sorted_positions(count).await {
            Ok(positions) => positions,
            Err(e) => abort!(
                RunStage::FetchPositions,
                MonitorError::PositionDataUnavailable(e)
            ),
        };

        enter(RunStage::ComputeExposure);
        match compute_exposure(ratio, &positions, &price) {
            Ok((exposure, eth)) => {
                info!(
                    exposure_eth = %eth,
                    positions_ahead = exposure.positions_ahead,
                    "Collateral ahead in redemption order"
                );
                report.exposure = Some(eth);
                enter(RunStage::EvaluateExposure);
                let alert = policy::redemption_alert(eth, &self.settings.thresholds);
                self.dispatch(&mut report, alert.into_iter().collect()).await;
            }
            Err(e) => {
                error!(stage = %RunStage::ComputeExposure, error = %e, "Redemption scan failed");
            }
        }

        enter(RunStage::TrackState);
        let tracker = StateTracker::new(self.store.as_ref(), &self.settings.position);
        match tracker.track(&positions).await {
            Ok(tracked) => {
                let change = tracked.change;
                if change.is_modified() {
                    info!("Trove's debt and/or collateral were modified");
                }
                report.change = Some(change);
                let alert = policy::mutation_alert(&change);
                self.dispatch(&mut report, alert.into_iter().collect()).await;
                if let Some(e) = tracked.save_error {
                    self.persistence_failed(&mut report, e);
                }
            }
            Err(e) => self.persistence_failed(&mut report, e),
        }

        enter(RunStage::Done);
        info!(
            alerts_sent = report.alerts_sent,
            alerts_failed = report.alerts_failed,
            "Finished trove health check"
        );
        RunOutcome::Completed(report)
    }

    /// Query status first and only then decimals; an untrusted feed is not
    /// queried further.
    async fn check_oracle(&self) -> Result<u32, OracleError> {
        let status = self
            .chain
            .oracle
            .status()
            .await
            .map_err(OracleError::Unreachable)?;
        if !status.is_normal() {
            return Err(OracleError::WrongStatus(status));
        }
        let decimals = self
            .chain
            .oracle
            .decimals()
            .await
            .map_err(OracleError::Unreachable)?;
        validate_oracle(status, decimals, self.settings.expected_oracle_decimals)?;
        Ok(decimals)
    }

    async fn registry_ratio(&self, price: &PriceReading) -> Option<Decimal> {
        let raw = match self
            .chain
            .registry
            .current_ratio(&self.settings.position, price.answer)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Registry ratio unavailable");
                return None;
            }
        };
        match Decimal::from_scaled(raw, price.decimals) {
            Ok(value) => {
                debug!(registry_ratio = %value, "Registry-reported collateral ratio");
                Some(value)
            }
            Err(e) => {
                warn!(error = %e, "Registry ratio out of range");
                None
            }
        }
    }

    fn persistence_failed(&self, report: &mut RunReport, e: StoreError) {
        let e = MonitorError::PersistenceFailure(e);
        error!(stage = %RunStage::TrackState, error = %e, "Snapshot not updated");
        report.persistence_failed = true;
    }

    /// Send each alert; a failed delivery is logged and never stops the run.
    async fn dispatch(&self, report: &mut RunReport, alerts: Vec<AlertEvent>) {
        for alert in alerts {
            info!(kind = ?alert.kind, severity = %alert.severity, body = %alert.body, "Alert");
            match self.notifier.send(&alert).await {
                Ok(()) => report.alerts_sent += 1,
                Err(e) => {
                    let e = MonitorError::NotificationFailure(e);
                    error!(kind = ?alert.kind, error = %e, "Could not deliver alert");
                    report.alerts_failed += 1;
                }
            }
        }
    }
}

fn enter(stage: RunStage) {
    debug!(stage = %stage, "Entering stage");
}

/// Redemption scan plus conversion of the summed wei to ETH.
fn compute_exposure(
    ratio: CollateralRatio,
    positions: &[Position],
    price: &PriceReading,
) -> Result<(RedemptionExposure, Decimal), MonitorError> {
    let exposure = redemption_exposure(ratio, positions, price)?;
    let eth = exposure.in_asset_units().map_err(RatioError::from)?;
    Ok((exposure, eth))
}
