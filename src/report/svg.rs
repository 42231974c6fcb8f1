use {crate::models::EquityPoint, std::fmt::Write};

/// Canvas and colours for the equity chart.
#[derive(Debug, Clone, Copy)]
pub struct SvgOptions {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub strategy_colour: &'static str,
    pub buy_hold_colour: &'static str,
    pub background: &'static str,
}

impl SvgOptions {
    pub const DEFAULT: SvgOptions = SvgOptions {
        width: 960.0,
        height: 420.0,
        padding: 40.0,
        strategy_colour: "#ed6925",
        buy_hold_colour: "#8c8c8c",
        background: "#191919",
    };
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Strategy equity against buy-and-hold as two polylines on a shared y scale.
///
/// X is candle index, not time, so gaps in the data do not stretch the chart.
pub fn equity_svg(curve: &[EquityPoint], title: &str, opts: &SvgOptions) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = opts.width,
        h = opts.height
    );
    let _ = writeln!(
        svg,
        r#"<rect width="100%" height="100%" fill="{}"/>"#,
        opts.background
    );
    let _ = writeln!(
        svg,
        r##"<text x="{}" y="{}" fill="#dddddd" font-family="monospace" font-size="14">{}</text>"##,
        opts.padding,
        opts.padding / 2.0 + 5.0,
        escape(title)
    );

    if let Some((lo, hi)) = value_range(curve) {
        let span = if hi - lo > f64::EPSILON { hi - lo } else { 1.0 };
        let plot_w = (opts.width - 2.0 * opts.padding).max(1.0);
        let plot_h = (opts.height - 2.0 * opts.padding).max(1.0);
        let step = if curve.len() > 1 {
            plot_w / (curve.len() - 1) as f64
        } else {
            0.0
        };
        let project = |i: usize, v: f64| {
            let x = opts.padding + i as f64 * step;
            let y = opts.padding + (hi - v) / span * plot_h;
            (x, y)
        };

        let _ = writeln!(
            svg,
            r##"<text x="{}" y="{}" fill="#aaaaaa" font-family="monospace" font-size="11">{:.2}</text>"##,
            2.0,
            opts.padding + 4.0,
            hi
        );
        let _ = writeln!(
            svg,
            r##"<text x="{}" y="{}" fill="#aaaaaa" font-family="monospace" font-size="11">{:.2}</text>"##,
            2.0,
            opts.padding + plot_h + 4.0,
            lo
        );

        let buy_hold = polyline(curve, |p| p.buy_hold_equity, &project);
        let strategy = polyline(curve, |p| p.strategy_equity, &project);
        for (colour, points) in [(opts.buy_hold_colour, buy_hold), (opts.strategy_colour, strategy)] {
            let _ = writeln!(
                svg,
                r#"<polyline fill="none" stroke="{}" stroke-width="1.5" points="{}"/>"#,
                colour, points
            );
        }
    }

    svg.push_str("</svg>\n");
    svg
}

fn polyline(
    curve: &[EquityPoint],
    pick: impl Fn(&EquityPoint) -> f64,
    project: &impl Fn(usize, f64) -> (f64, f64),
) -> String {
    curve
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let (x, y) = project(i, pick(p));
            format!("{:.2},{:.2}", x, y)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn value_range(curve: &[EquityPoint]) -> Option<(f64, f64)> {
    curve
        .iter()
        .flat_map(|p| [p.strategy_equity, p.buy_hold_equity])
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> Vec<EquityPoint> {
        (0..5)
            .map(|i| EquityPoint {
                timestamp_ms: i * 1_000,
                strategy_equity: 100.0 + i as f64,
                buy_hold_equity: 100.0 + 2.0 * i as f64,
            })
            .collect()
    }

    #[test]
    fn draws_two_polylines_inside_canvas() {
        let opts = SvgOptions::default();
        let svg = equity_svg(&curve(), "BTC <1h>", &opts);

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains("BTC &lt;1h&gt;"));

        // Highest value sits on the top padding line, lowest on the bottom one.
        assert!(svg.contains("920.00,40.00"));
        assert!(svg.contains("40.00,380.00"));
    }

    #[test]
    fn empty_curve_is_still_a_document() {
        let svg = equity_svg(&[], "empty", &SvgOptions::default());
        assert!(svg.contains("<svg"));
        assert!(!svg.contains("<polyline"));
    }
}
