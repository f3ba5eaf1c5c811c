//! SVG rendering of observed history against the fitted and forecast curve

use crate::error::{ForecastError, Result};
use crate::models::ForecastResult;
use chrono::NaiveDateTime;
use std::fs;
use std::path::Path;

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 600.0;
const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 60.0;
const Y_TICKS: usize = 5;

/// Inputs of one forecast chart
#[derive(Debug, Clone)]
pub struct ForecastPlot<'a> {
    /// Chart title
    pub title: String,
    /// Observed timestamps
    pub history_timestamps: &'a [NaiveDateTime],
    /// Observed values
    pub history_values: &'a [f64],
    /// Model output over history and future
    pub forecast: &'a ForecastResult,
    /// First future timestamp, marked with a vertical rule
    pub forecast_start: Option<NaiveDateTime>,
}

impl ForecastPlot<'_> {
    /// Render the chart as a standalone SVG document
    pub fn render_svg(&self) -> Result<String> {
        if self.history_timestamps.len() != self.history_values.len() {
            return Err(ForecastError::DataError(
                "history timestamps and values differ in length".to_string(),
            ));
        }

        let times: Vec<i64> = self
            .history_timestamps
            .iter()
            .chain(self.forecast.timestamps().iter())
            .map(|ts| ts.and_utc().timestamp())
            .collect();
        let values: Vec<f64> = self
            .history_values
            .iter()
            .chain(self.forecast.values().iter())
            .copied()
            .collect();

        let (Some(&t_min), Some(&t_max)) = (times.iter().min(), times.iter().max()) else {
            return Err(ForecastError::DataError("nothing to plot".to_string()));
        };
        let (mut y_min, mut y_max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let pad = ((y_max - y_min) * 0.05).max(1.0);
        y_min -= pad;
        y_max += pad;

        let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let t_span = ((t_max - t_min) as f64).max(1.0);
        let x = |ts: &NaiveDateTime| {
            MARGIN_LEFT + (ts.and_utc().timestamp() - t_min) as f64 / t_span * plot_w
        };
        let y = |v: f64| MARGIN_TOP + (1.0 - (v - y_min) / (y_max - y_min)) * plot_h;

        let mut svg = String::new();
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
            w = WIDTH,
            h = HEIGHT
        ));
        svg.push_str("<rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"30\" font-family=\"sans-serif\" font-size=\"18\" text-anchor=\"middle\">{}</text>\n",
            WIDTH / 2.0,
            escape(&self.title)
        ));

        // Grid and y labels
        for i in 0..=Y_TICKS {
            let value = y_min + (y_max - y_min) * i as f64 / Y_TICKS as f64;
            let py = y(value);
            svg.push_str(&format!(
                "<line x1=\"{:.1}\" y1=\"{py:.1}\" x2=\"{:.1}\" y2=\"{py:.1}\" stroke=\"#dddddd\"/>\n",
                MARGIN_LEFT,
                WIDTH - MARGIN_RIGHT
            ));
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" font-family=\"sans-serif\" font-size=\"11\" text-anchor=\"end\">{:.0}</text>\n",
                MARGIN_LEFT - 8.0,
                py + 4.0,
                value
            ));
        }

        // X labels at both ends
        let first = self
            .history_timestamps
            .iter()
            .chain(self.forecast.timestamps().iter())
            .min();
        let last = self
            .history_timestamps
            .iter()
            .chain(self.forecast.timestamps().iter())
            .max();
        for (ts, anchor) in [(first, "start"), (last, "end")] {
            if let Some(ts) = ts {
                svg.push_str(&format!(
                    "<text x=\"{:.1}\" y=\"{:.1}\" font-family=\"sans-serif\" font-size=\"11\" text-anchor=\"{}\">{}</text>\n",
                    x(ts),
                    HEIGHT - MARGIN_BOTTOM + 20.0,
                    anchor,
                    ts.format("%Y-%m-%d")
                ));
            }
        }

        if let Some(start) = self.forecast_start {
            let px = x(&start);
            svg.push_str(&format!(
                "<line x1=\"{px:.1}\" y1=\"{:.1}\" x2=\"{px:.1}\" y2=\"{:.1}\" stroke=\"#888888\" stroke-dasharray=\"6,4\"/>\n",
                MARGIN_TOP,
                HEIGHT - MARGIN_BOTTOM
            ));
        }

        let points: Vec<String> = self
            .forecast
            .timestamps()
            .iter()
            .zip(self.forecast.values().iter())
            .map(|(ts, &v)| format!("{:.1},{:.1}", x(ts), y(v)))
            .collect();
        svg.push_str(&format!(
            "<polyline fill=\"none\" stroke=\"#0072B2\" stroke-width=\"2\" points=\"{}\"/>\n",
            points.join(" ")
        ));

        for (ts, &v) in self.history_timestamps.iter().zip(self.history_values.iter()) {
            svg.push_str(&format!(
                "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"2\" fill=\"black\"/>\n",
                x(ts),
                y(v)
            ));
        }

        svg.push_str("</svg>\n");
        Ok(svg)
    }

    /// Render and write the chart, replacing any previous file
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let svg = self.render_svg()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ForecastError::artifact(parent, e))?;
        }
        fs::write(path, svg).map_err(|e| ForecastError::artifact(path, e))
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
