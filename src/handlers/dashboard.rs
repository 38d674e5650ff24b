use axum::{extract::State, response::Html, Json};

use crate::models::dashboard::DashboardStats;
use crate::models::price_history::PriceHistory;
use crate::AppState;

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Ticket Price Tracker</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
    <script src="https://cdn.jsdelivr.net/npm/chartjs-adapter-date-fns"></script>
    <style>
        * { box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #1a1a2e;
            color: #eee;
            margin: 0;
            padding: 20px;
        }
        h1 { color: #00d9ff; margin-bottom: 10px; }
        .container { max-width: 1200px; margin: 0 auto; }
        .chart-container { background: #16213e; border-radius: 12px; padding: 20px; margin-bottom: 20px; }
        .stats {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
            gap: 15px;
            margin-bottom: 20px;
        }
        .stat-card { background: #16213e; border-radius: 8px; padding: 15px; text-align: center; }
        .stat-value { font-size: 2em; color: #00d9ff; font-weight: bold; }
        .stat-label { color: #888; font-size: 0.9em; }
        .url-info {
            background: #16213e;
            border-radius: 8px;
            padding: 15px;
            margin-bottom: 20px;
            word-break: break-all;
            font-size: 0.9em;
            color: #888;
        }
        .no-data { text-align: center; padding: 50px; color: #666; }
    </style>
</head>
<body>
    <div class="container">
        <h1>Ticket Price Tracker</h1>
{{content}}
    </div>
</body>
</html>
"#;

const STATS_SECTION: &str = r#"
        <div class="url-info">Tracking: {{url}}</div>

        <div class="stats">
            <div class="stat-card">
                <div class="stat-value">${{current_price}}</div>
                <div class="stat-label">Current Price</div>
            </div>
            <div class="stat-card">
                <div class="stat-value">${{lowest_price}}</div>
                <div class="stat-label">Lowest Price</div>
            </div>
            <div class="stat-card">
                <div class="stat-value">${{highest_price}}</div>
                <div class="stat-label">Highest Price</div>
            </div>
            <div class="stat-card">
                <div class="stat-value">{{data_points}}</div>
                <div class="stat-label">Data Points</div>
            </div>
        </div>

        <div class="chart-container">
            <canvas id="priceChart"></canvas>
        </div>

        <script>
            const ctx = document.getElementById('priceChart').getContext('2d');
            const priceData = {{price_data}};

            new Chart(ctx, {
                type: 'line',
                data: {
                    labels: priceData.map(d => d.timestamp),
                    datasets: [{
                        label: 'Price ($)',
                        data: priceData.map(d => d.price),
                        borderColor: '#00d9ff',
                        backgroundColor: 'rgba(0, 217, 255, 0.1)',
                        fill: true,
                        tension: 0.3,
                        pointRadius: 4,
                        pointHoverRadius: 6
                    }]
                },
                options: {
                    responsive: true,
                    plugins: {
                        legend: { display: false },
                        title: { display: true, text: 'Price History', color: '#eee', font: { size: 16 } }
                    },
                    scales: {
                        x: {
                            type: 'time',
                            time: { unit: 'day' },
                            ticks: { color: '#888' },
                            grid: { color: '#333' }
                        },
                        y: {
                            ticks: { color: '#888', callback: function(value) { return '$' + value; } },
                            grid: { color: '#333' }
                        }
                    }
                }
            });
        </script>
"#;

const NO_DATA_SECTION: &str = r#"
        <div class="no-data">
            <h2>No price data yet</h2>
            <p>The tracker will start collecting data once it runs.</p>
        </div>
"#;

/// GET / - stats and chart for the first tracked URL
pub async fn get_dashboard(State(state): State<AppState>) -> Html<String> {
    let stats = match state.store.urls().await.into_iter().next() {
        Some(url) => {
            let history = state.store.all(&url).await;
            DashboardStats::from_history(url, history)
        }
        None => None,
    };

    Html(render_dashboard(stats.as_ref()))
}

/// GET /api/prices - full history for every tracked URL
pub async fn get_prices(State(state): State<AppState>) -> Json<PriceHistory> {
    Json(state.store.snapshot().await)
}

pub fn render_dashboard(stats: Option<&DashboardStats>) -> String {
    let content = match stats {
        Some(stats) => render_stats(stats),
        None => NO_DATA_SECTION.to_string(),
    };

    DASHBOARD_HTML.replace("{{content}}", &content)
}

fn render_stats(stats: &DashboardStats) -> String {
    let price_data = serde_json::to_string(&stats.history).unwrap_or_else(|e| {
        tracing::error!("Failed to serialize price history: {}", e);
        "[]".to_string()
    });

    STATS_SECTION
        .replace("{{url}}", &escape_html(&stats.url))
        .replace("{{current_price}}", &format!("{:.2}", stats.current_price))
        .replace("{{lowest_price}}", &format!("{:.2}", stats.lowest_price))
        .replace("{{highest_price}}", &format!("{:.2}", stats.highest_price))
        .replace("{{data_points}}", &stats.data_points.to_string())
        // keep "</script>" inside JSON strings from closing the tag
        .replace("{{price_data}}", &price_data.replace("</", "<\\/"))
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
