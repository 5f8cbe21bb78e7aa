//! Web dashboard with JSON API endpoints and a server-rendered SVG chart

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::view::{format_temperature, DerivedView, ViewCache, NO_DATA};
use crate::ExplorerError;

/// Dashboard application state
#[derive(Clone)]
pub struct DashboardState {
    pub views: Arc<ViewCache>,
    pub refresh_interval_ms: u64,
}

/// Build the dashboard axum router
pub fn build_router(views: Arc<ViewCache>, refresh_interval_ms: u64) -> Router {
    let dashboard_state = DashboardState {
        views,
        refresh_interval_ms,
    };

    Router::new()
        .route("/", get(index_handler))
        .route("/chart.svg", get(chart_handler))
        .route("/api/view", get(view_handler))
        .route("/api/current", get(current_handler))
        .route("/api/history", get(history_handler))
        .route("/api/average", get(average_handler))
        .route("/api/trend", get(trend_handler))
        .route("/api/status", get(status_handler))
        .route("/health", get(health_handler))
        .with_state(dashboard_state)
}

/// Serve the dashboard on an already bound listener until cancelled
pub async fn serve(
    listener: TcpListener,
    router: Router,
    cancel: CancellationToken,
) -> crate::Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            cancel.cancelled().await;
        })
        .await
        .map_err(|e| ExplorerError::Dashboard(format!("Server error: {}", e)))
}

async fn index_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let view = dashboard.views.current().await;

    let history_rows: String = view
        .table
        .iter()
        .map(|row| {
            format!(
                r#"<tr style="border-bottom: 1px solid #dee2e6;">
                    <td style="padding: 0.5rem;">{}</td>
                    <td style="padding: 0.5rem;">{:?}</td>
                </tr>"#,
                row.time, row.value
            )
        })
        .collect();

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Antarctic Explorer</title>
    <script>
        function refreshData() {{
            fetch('/api/view')
                .then(r => r.json())
                .then(data => {{
                    document.getElementById('current-temp').textContent = data.current_reading_text;
                    document.getElementById('current-time').textContent = data.current_time_text;
                    document.getElementById('average-temp').textContent = data.windowed_average_text;
                    const tbody = document.getElementById('history-body');
                    tbody.innerHTML = data.view.table.map(row => {{
                        return `<tr style="border-bottom: 1px solid #dee2e6;">
                            <td style="padding: 0.5rem;">${{row.time}}</td>
                            <td style="padding: 0.5rem;">${{row.value}}</td>
                        </tr>`;
                    }}).join('');
                }})
                .catch(err => console.warn('Dashboard refresh failed', err));
            document.getElementById('chart').src = '/chart.svg?t=' + Date.now();
        }}
        setInterval(refreshData, {refresh_interval_ms});
    </script>
</head>
<body style="font-family: system-ui, sans-serif; max-width: 960px; margin: 0 auto; padding: 1rem;">
    <h1>Antarctic Explorer</h1>
    <p>A demonstration of real-time temperature readings in Antarctica.</p>
    <section style="display: flex; gap: 1rem;">
        <div style="flex: 1; padding: 1rem; border-radius: 0.5rem; color: #fff; background: linear-gradient(135deg, #4b0082, #7b2ff7);">
            <div>Real Temp</div>
            <div id="current-temp" style="font-size: 2rem; font-weight: 600;">{current_temp}</div>
        </div>
        <div style="flex: 1; padding: 1rem; border-radius: 0.5rem; color: #fff; background: linear-gradient(135deg, #4b0082, #7b2ff7);">
            <div>Real Time</div>
            <div id="current-time" style="font-size: 1.5rem; font-weight: 600;">{current_time}</div>
        </div>
        <div style="flex: 1; padding: 1rem; border-radius: 0.5rem; color: #fff; background: linear-gradient(135deg, #4b0082, #7b2ff7);">
            <div>Average (last {window})</div>
            <div id="average-temp" style="font-size: 2rem; font-weight: 600;">{average_temp}</div>
        </div>
    </section>
    <section>
        <h2>Recent Readings</h2>
        <table style="width: 100%; border-collapse: collapse;">
            <thead>
                <tr style="border-bottom: 2px solid #dee2e6;">
                    <th style="padding: 0.5rem; text-align: left;">Timestamp</th>
                    <th style="padding: 0.5rem; text-align: left;">Temperature (°C)</th>
                </tr>
            </thead>
            <tbody id="history-body">{history_rows}</tbody>
        </table>
    </section>
    <section>
        <h2>Trend</h2>
        <img id="chart" src="/chart.svg" alt="Temperature Readings with Regression Line" style="width: 100%;">
    </section>
</body>
</html>"#,
        refresh_interval_ms = dashboard.refresh_interval_ms,
        current_temp = view.current_reading_text(),
        current_time = view.current_time_text(),
        window = format_window(dashboard.views.window()),
        average_temp = view.windowed_average_text(),
        history_rows = history_rows,
    );

    Html(html)
}

/// Render the averaging window in the largest unit that divides it evenly
fn format_window(window: Duration) -> String {
    let secs = window.as_secs();
    if secs >= 3600 && secs % 3600 == 0 {
        format!("{} h", secs / 3600)
    } else if secs >= 60 && secs % 60 == 0 {
        format!("{} min", secs / 60)
    } else {
        format!("{} s", secs)
    }
}

async fn chart_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let view = dashboard.views.current().await;
    (
        [(header::CONTENT_TYPE, "image/svg+xml")],
        render_chart(&view),
    )
}

async fn view_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let view = dashboard.views.current().await;
    axum::Json(serde_json::json!({
        "current_reading_text": view.current_reading_text(),
        "current_time_text": view.current_time_text(),
        "windowed_average_text": view.windowed_average_text(),
        "view": &*view,
    }))
}

async fn current_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    axum::Json(dashboard.views.current_reading().await)
}

async fn history_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    axum::Json(dashboard.views.history_table().await)
}

async fn average_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let view = dashboard.views.current().await;
    axum::Json(serde_json::json!({
        "value": view.windowed_average,
        "text": view.windowed_average_text(),
        "window_seconds": dashboard.views.window().as_secs(),
    }))
}

async fn trend_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let view = dashboard.views.current().await;
    axum::Json(serde_json::json!({
        "slope": view.trend.map(|t| t.slope),
        "intercept": view.trend.map(|t| t.intercept),
        "r_squared": view.trend.and_then(|t| t.r_squared),
        "points": view.trend_series(),
    }))
}

async fn status_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.views.state().read().await;
    axum::Json(serde_json::json!({
        "ticks": state.generation(),
        "buffered": state.history().len(),
        "capacity": state.history().capacity(),
        "uptime_seconds": state.uptime().as_secs(),
        "last_tick": state.history().latest().map(|r| r.timestamp()),
        "refresh_interval_ms": dashboard.refresh_interval_ms,
    }))
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}

const CHART_WIDTH: f64 = 640.0;
const CHART_HEIGHT: f64 = 360.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 70.0;

/// Scatter plot of the readings with the regression line drawn over it
pub fn render_chart(view: &DerivedView) -> String {
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="system-ui, sans-serif" font-size="12">
<text x="{cx}" y="24" text-anchor="middle" font-size="16">Temperature Readings with Regression Line</text>
<text x="{cx}" y="{xl}" text-anchor="middle">Time</text>
<text x="16" y="{cy}" text-anchor="middle" transform="rotate(-90 16 {cy})">Temperature (°C)</text>
"#,
        w = CHART_WIDTH,
        h = CHART_HEIGHT,
        cx = CHART_WIDTH / 2.0,
        cy = CHART_HEIGHT / 2.0,
        xl = CHART_HEIGHT - 10.0,
    );

    if view.table.is_empty() {
        let _ = writeln!(
            svg,
            "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" fill=\"#6c757d\">{}</text>",
            CHART_WIDTH / 2.0,
            CHART_HEIGHT / 2.0,
            NO_DATA
        );
        svg.push_str("</svg>");
        return svg;
    }

    let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

    let (mut y_min, mut y_max) = view
        .table
        .iter()
        .map(|row| row.value)
        .chain(view.trend_line.iter().copied())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if y_max - y_min < f64::EPSILON {
        y_min -= 0.5;
        y_max += 0.5;
    }

    let steps = view.table.len().saturating_sub(1).max(1) as f64;
    let x_at = |index: usize| -> f64 {
        if view.table.len() == 1 {
            MARGIN_LEFT + plot_width / 2.0
        } else {
            MARGIN_LEFT + plot_width * index as f64 / steps
        }
    };
    let y_at = |value: f64| -> f64 { MARGIN_TOP + plot_height * (y_max - value) / (y_max - y_min) };

    // Axes
    let _ = writeln!(
        svg,
        "<line x1=\"{x0}\" y1=\"{y0}\" x2=\"{x0}\" y2=\"{y1}\" stroke=\"#333\"/>\n<line x1=\"{x0}\" y1=\"{y1}\" x2=\"{x1}\" y2=\"{y1}\" stroke=\"#333\"/>",
        x0 = MARGIN_LEFT,
        y0 = MARGIN_TOP,
        x1 = MARGIN_LEFT + plot_width,
        y1 = MARGIN_TOP + plot_height,
    );
    for value in [y_min, y_max] {
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{:.1}" text-anchor="end">{}</text>"#,
            MARGIN_LEFT - 6.0,
            y_at(value) + 4.0,
            format_temperature(value)
        );
    }

    for row in &view.table {
        let x = x_at(row.index);
        let _ = writeln!(
            svg,
            "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"5\" fill=\"blue\"><title>{} {:?}</title></circle>",
            x,
            y_at(row.value),
            row.time,
            row.value
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end" transform="rotate(-30 {:.1} {:.1})">{}</text>"#,
            x,
            MARGIN_TOP + plot_height + 16.0,
            x,
            MARGIN_TOP + plot_height + 16.0,
            row.timestamp.format("%H:%M:%S")
        );
    }

    if view.trend_line.is_empty() {
        let _ = writeln!(
            svg,
            "<text x=\"{}\" y=\"{}\" text-anchor=\"end\" fill=\"#6c757d\">Not enough data for a trend line</text>",
            CHART_WIDTH - MARGIN_RIGHT,
            MARGIN_TOP - 4.0
        );
    } else {
        let points: Vec<String> = view
            .trend_series()
            .into_iter()
            .map(|(index, fitted)| format!("{:.1},{:.1}", x_at(index), y_at(fitted)))
            .collect();
        let _ = writeln!(
            svg,
            "<polyline class=\"trend\" points=\"{}\" fill=\"none\" stroke=\"#d62728\" stroke-width=\"2\"/>",
            points.join(" ")
        );
    }

    svg.push_str("</svg>");
    svg
}
