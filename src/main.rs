// Demo entry point - Dependency injection and a short panel run
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chart_panel::application::panel::ChartPanel;
use chart_panel::domain::options::Surface;
use chart_panel::domain::records::StateRecord;
use chart_panel::infrastructure::adapter_factory::BackendFactory;
use chart_panel::infrastructure::config::{EntitySpec, PanelConfig, load_panel_config};
use chart_panel::infrastructure::memory_source::InMemorySource;
use chrono::{Duration as ChronoDuration, Utc};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration, falling back to the built-in demo panel
    let config = match load_panel_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::info!("no usable config/panel.toml ({}); using the demo panel", e);
            demo_config()
        }
    };

    // Create the data source (infrastructure layer)
    let source = Arc::new(demo_source());

    // Create the panel (application layer) and mount it
    let factory = Arc::new(BackendFactory::new(config.backend));
    let mut panel = ChartPanel::new(config, source, factory)?;
    let surface = Surface {
        id: "demo-panel".to_string(),
        width: 800,
        height: 300,
    };
    panel.attach(Some(surface), "default").await?;

    // Let a couple of refresh cycles run, then tear down
    tokio::time::sleep(Duration::from_secs(2)).await;
    panel.refresh_now().await;
    panel.detach().await;

    Ok(())
}

fn demo_config() -> PanelConfig {
    PanelConfig {
        title: Some("Climate".to_string()),
        entities: vec![
            EntitySpec {
                entity: "sensor.temperature".to_string(),
                name: Some("Temperature".to_string()),
                color: Some("#e6772e".to_string()),
                unit: Some("°C".to_string()),
                kind: None,
                attribute: None,
                axis_id: Some("temp".to_string()),
                statistics: None,
                show: true,
            },
            EntitySpec {
                entity: "sensor.humidity".to_string(),
                name: Some("Humidity".to_string()),
                color: Some("#4a90d9".to_string()),
                unit: Some("%".to_string()),
                kind: None,
                attribute: None,
                axis_id: Some("hum".to_string()),
                statistics: None,
                show: true,
            },
        ],
        refresh_seconds: 5,
        ..PanelConfig::default()
    }
}

/// A day of five-minute readings shaped like a slow daily cycle.
fn demo_source() -> InMemorySource {
    let now = Utc::now();
    let mut temperature = Vec::new();
    let mut humidity = Vec::new();
    for i in 0..288i64 {
        let t = now - ChronoDuration::minutes(5 * (288 - i));
        let phase = i as f64 / 288.0 * std::f64::consts::TAU;
        temperature.push(StateRecord {
            state: format!("{:.1}", 21.0 + 2.5 * phase.sin()),
            last_changed: t,
            attributes: HashMap::new(),
        });
        humidity.push(StateRecord {
            state: format!("{:.0}", 55.0 + 10.0 * (phase * 2.0).cos()),
            last_changed: t,
            attributes: HashMap::new(),
        });
    }
    InMemorySource::new()
        .with_history("sensor.temperature", temperature)
        .with_history("sensor.humidity", humidity)
}
