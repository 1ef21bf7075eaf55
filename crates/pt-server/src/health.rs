//! Health checks
//!
//! Reports the entity store and blob storage. Reports are cached briefly so
//! probes do not hammer the database.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use pt_db::Database;
use pt_files::Storage;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Health check status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy | Self::Degraded)
    }
}

/// Individual component health
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Overall health report
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: Vec<ComponentHealth>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl HealthReport {
    pub fn http_status(&self) -> StatusCode {
        match self.status {
            HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Health checker configuration
#[derive(Debug, Clone)]
pub struct HealthConfig {
    /// Timeout for individual health checks
    pub check_timeout: Duration,
    /// Cache duration for health results
    pub cache_duration: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_timeout: Duration::from_secs(5),
            cache_duration: Duration::from_secs(10),
        }
    }
}

struct CachedHealth {
    report: HealthReport,
    cached_at: Instant,
}

pub struct HealthChecker {
    config: HealthConfig,
    start_time: Instant,
    cache: RwLock<Option<CachedHealth>>,
    /// Absent for the in-memory store
    database: Option<Database>,
    storage: Arc<dyn Storage>,
}

impl HealthChecker {
    pub fn new(config: HealthConfig, storage: Arc<dyn Storage>) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            cache: RwLock::new(None),
            database: None,
            storage,
        }
    }

    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    /// Get cached health or perform checks
    pub async fn check(&self) -> HealthReport {
        {
            let cache = self.cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.cached_at.elapsed() < self.config.cache_duration {
                    debug!("Returning cached health report");
                    return cached.report.clone();
                }
            }
        }

        let report = self.perform_checks().await;

        *self.cache.write().await = Some(CachedHealth {
            report: report.clone(),
            cached_at: Instant::now(),
        });
        report
    }

    async fn perform_checks(&self) -> HealthReport {
        let components = vec![self.check_store().await, self.check_storage()];
        let status = components
            .iter()
            .map(|c| c.status)
            .fold(HealthStatus::Healthy, |overall, status| match (overall, status) {
                (HealthStatus::Unhealthy, _) | (_, HealthStatus::Unhealthy) => HealthStatus::Unhealthy,
                (HealthStatus::Degraded, _) | (_, HealthStatus::Degraded) => HealthStatus::Degraded,
                _ => HealthStatus::Healthy,
            });

        HealthReport {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            components,
            timestamp: chrono::Utc::now(),
        }
    }

    async fn check_store(&self) -> ComponentHealth {
        let start = Instant::now();
        let Some(ref database) = self.database else {
            return ComponentHealth {
                name: "store".to_string(),
                status: HealthStatus::Healthy,
                message: Some("In-memory store".to_string()),
                response_time_ms: 0,
                details: Some(serde_json::json!({ "type": "memory" })),
            };
        };

        let (status, message) =
            match tokio::time::timeout(self.config.check_timeout, database.ping()).await {
                Ok(Ok(())) => (HealthStatus::Healthy, "Connected".to_string()),
                Ok(Err(e)) => {
                    warn!(error = %e, "database ping failed");
                    (HealthStatus::Unhealthy, e.to_string())
                }
                Err(_) => (HealthStatus::Unhealthy, "Ping timed out".to_string()),
            };
        let stats = database.stats();

        ComponentHealth {
            name: "store".to_string(),
            status,
            message: Some(message),
            response_time_ms: start.elapsed().as_millis() as u64,
            details: Some(serde_json::json!({
                "type": "postgresql",
                "pool_size": stats.size,
                "idle_connections": stats.idle
            })),
        }
    }

    fn check_storage(&self) -> ComponentHealth {
        ComponentHealth {
            name: "storage".to_string(),
            status: HealthStatus::Healthy,
            message: None,
            response_time_ms: 0,
            details: Some(serde_json::json!({
                "backend": self.storage.name(),
                "max_upload_bytes": self.storage.max_size()
            })),
        }
    }
}

/// Simple liveness check
pub async fn liveness() -> &'static str {
    "OK"
}

/// Full health report
pub async fn health(State(checker): State<Arc<HealthChecker>>) -> (StatusCode, Json<HealthReport>) {
    let report = checker.check().await;
    let status = report.http_status();
    (status, Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pt_files::MemoryStorage;

    fn checker(cache_duration: Duration) -> HealthChecker {
        HealthChecker::new(
            HealthConfig {
                cache_duration,
                ..Default::default()
            },
            Arc::new(MemoryStorage::default()),
        )
    }

    #[tokio::test]
    async fn test_memory_deployment_is_healthy() {
        let report = checker(Duration::ZERO).check().await;
        assert!(report.status.is_healthy());
        let names: Vec<_> = report.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["store", "storage"]);
    }

    #[tokio::test]
    async fn test_health_cache() {
        let checker = checker(Duration::from_secs(60));
        let report1 = checker.check().await;
        let report2 = checker.check().await;
        assert_eq!(report1.timestamp, report2.timestamp);
    }

    #[test]
    fn test_health_status_http() {
        let report = |status| HealthReport {
            status,
            version: "1.0".to_string(),
            uptime_seconds: 100,
            components: vec![],
            timestamp: chrono::Utc::now(),
        };
        assert_eq!(report(HealthStatus::Degraded).http_status(), StatusCode::OK);
        assert_eq!(
            report(HealthStatus::Unhealthy).http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
