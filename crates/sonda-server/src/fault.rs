//! Synthetic failure decisions for the mock endpoints.
//!
//! Two rules are deterministic (login on identifiers divisible by 5,
//! alteração on identifiers divisible by 3), one is probabilistic
//! (pedidos, 10% per call by default), and cadastro never fails. Fired
//! failures draw uniformly from a fixed four-entry catalog.
//!
//! All randomness — fault selection and identifier generation — flows
//! through one seedable source so tests can pin the sequence.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sonda_proto::ErroBody;
use std::sync::Mutex;
use tracing::debug;

/// Default probability that a pedidos call fails.
pub const DEFAULT_LIST_FAILURE_RATE: f64 = 0.10;

/// The fixed failure catalog. Order matters only for reproducibility of
/// seeded draws; selection is uniform over the four entries.
pub const FAULT_CATALOG: [(u16, &str); 4] = [
    (504, "Gateway Timeout"),
    (401, "Unauthorized"),
    (400, "Bad Request"),
    (500, "Internal Server Error"),
];

/// The four simulated operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Cadastro,
    Login,
    Alteracao,
    Pedidos,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::Cadastro => "cadastro",
            Operation::Login => "login",
            Operation::Alteracao => "alteracao",
            Operation::Pedidos => "pedidos",
        };
        f.write_str(name)
    }
}

/// One synthetic failure drawn from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fault {
    pub status: u16,
    pub mensagem: &'static str,
}

impl Fault {
    /// True when this fault is one of the catalog entries.
    pub fn in_catalog(&self) -> bool {
        FAULT_CATALOG.contains(&(self.status, self.mensagem))
    }
}

impl IntoResponse for Fault {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErroBody::new(self.mensagem))).into_response()
    }
}

/// Decides whether an operation fails and picks the failure.
///
/// Shared by all request handlers; the RNG sits behind a `Mutex` because
/// axum handlers run concurrently, but there is no other shared state.
pub struct FaultInjector {
    rng: Mutex<SmallRng>,
    list_failure_rate: f64,
}

impl Default for FaultInjector {
    fn default() -> Self {
        Self::new()
    }
}

impl FaultInjector {
    /// OS-seeded injector with the default pedidos failure rate.
    pub fn new() -> Self {
        Self::with_rate(DEFAULT_LIST_FAILURE_RATE)
    }

    /// OS-seeded injector with an explicit pedidos failure rate.
    ///
    /// The rate is clamped into [0.0, 1.0]; 0.0 and 1.0 force the
    /// success/failure branch deterministically.
    pub fn with_rate(list_failure_rate: f64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::from_os_rng()),
            list_failure_rate: list_failure_rate.clamp(0.0, 1.0),
        }
    }

    /// Deterministic injector for reproducible runs and tests.
    pub fn seeded(seed: u64) -> Self {
        Self::seeded_with_rate(seed, DEFAULT_LIST_FAILURE_RATE)
    }

    /// Deterministic injector with an explicit pedidos failure rate.
    pub fn seeded_with_rate(seed: u64, list_failure_rate: f64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
            list_failure_rate: list_failure_rate.clamp(0.0, 1.0),
        }
    }

    /// Returns the configured pedidos failure rate.
    pub fn list_failure_rate(&self) -> f64 {
        self.list_failure_rate
    }

    /// Decides whether `operation` fails for `usuario_id`.
    ///
    /// `None` means the caller proceeds on the success path.
    pub fn decide(&self, operation: Operation, usuario_id: u32) -> Option<Fault> {
        let fires = match operation {
            Operation::Cadastro => false,
            Operation::Login => usuario_id % 5 == 0,
            Operation::Alteracao => usuario_id % 3 == 0,
            Operation::Pedidos => self.roll(self.list_failure_rate),
        };

        if !fires {
            return None;
        }

        let fault = self.pick_fault();
        debug!(op = %operation, usuario_id, status = fault.status, "synthetic failure fired");
        Some(fault)
    }

    /// Generates a fresh identifier, uniform in [10000, 99999).
    pub fn new_usuario_id(&self) -> u32 {
        self.lock_rng().random_range(10_000..99_999)
    }

    fn roll(&self, probability: f64) -> bool {
        self.lock_rng().random_bool(probability)
    }

    fn pick_fault(&self) -> Fault {
        let index = self.lock_rng().random_range(0..FAULT_CATALOG.len());
        let (status, mensagem) = FAULT_CATALOG[index];
        Fault { status, mensagem }
    }

    fn lock_rng(&self) -> std::sync::MutexGuard<'_, SmallRng> {
        // An rng has no invariant to lose on poison; keep serving.
        self.rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
