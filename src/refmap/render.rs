// Drawing of the choropleth map.

use geo::{coord, BoundingRect, Coord, Rect};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::refmap::*;

const MAP_WIDTH: u32 = 800;
const LEGEND_WIDTH: u32 = 160;
const CAPTION_HEIGHT: u32 = 60;

/// The colour of the regions for which no ratio can be computed.
pub const NO_DATA: RGBColor = RGBColor(200, 200, 200);

// Viridis, sampled at 0, 0.25, 0.5, 0.75 and 1.
const COLOR_STOPS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

type DrawResult = Result<(), DrawingAreaErrorKind<std::io::Error>>;

/// Maps a ratio in [0, 1] onto the colour scale.
pub fn ratio_color(ratio: Option<f64>) -> RGBColor {
    let x = match ratio {
        Some(x) if x.is_finite() => x.clamp(0.0, 1.0),
        _ => return NO_DATA,
    };
    let pos = x * (COLOR_STOPS.len() - 1) as f64;
    let idx = (pos.floor() as usize).min(COLOR_STOPS.len() - 2);
    let t = pos - idx as f64;
    let (a, b) = (COLOR_STOPS[idx], COLOR_STOPS[idx + 1]);
    let lerp = |u: u8, v: u8| (u as f64 + (v as f64 - u as f64) * t).round() as u8;
    RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

/// Equirectangular projection, with the longitudes shrunk at the mean latitude
/// of the map.
struct Projection {
    x_scale: f64,
}

impl Projection {
    fn centered_on(bounds: &Rect<f64>) -> Projection {
        let mid_lat = (bounds.min().y + bounds.max().y) / 2.0;
        Projection {
            x_scale: mid_lat.to_radians().cos(),
        }
    }

    fn project(&self, c: Coord<f64>) -> (f64, f64) {
        (c.x * self.x_scale, c.y)
    }
}

fn map_bounds(rendered: &[RegionMapEntry]) -> Option<Rect<f64>> {
    rendered
        .iter()
        .filter_map(|r| r.polygon.bounding_rect())
        .reduce(|a, b| {
            Rect::new(
                coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            )
        })
}

/// Draws the regions coloured by their ratio, with a legend, as an SVG file.
pub fn render_map(rendered: &[RegionMapEntry], title: &str, path: &str) -> MapResult<()> {
    let bounds = map_bounds(rendered)
        .unwrap_or_else(|| Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 }));
    let projection = Projection::centered_on(&bounds);
    let (x0, y0) = projection.project(bounds.min());
    let (x1, y1) = projection.project(bounds.max());
    let dx = (x1 - x0).max(1e-6);
    let dy = (y1 - y0).max(1e-6);
    let map_height = (MAP_WIDTH as f64 * dy / dx).round().clamp(200.0, 1600.0) as u32;
    info!(
        "render_map: drawing {} regions to {:?} ({}x{})",
        rendered.len(),
        path,
        MAP_WIDTH + LEGEND_WIDTH,
        map_height + CAPTION_HEIGHT
    );

    let root = SVGBackend::new(
        path,
        (MAP_WIDTH + LEGEND_WIDTH, map_height + CAPTION_HEIGHT),
    )
    .into_drawing_area();
    root.fill(&WHITE).context(RenderingSnafu { path })?;
    let (map_area, legend_area) = root.split_horizontally(MAP_WIDTH as i32);

    let mut chart = ChartBuilder::on(&map_area)
        .caption(title, ("sans-serif", 22).into_font())
        .margin(10)
        .build_cartesian_2d(x0..x0 + dx, y0..y0 + dy)
        .context(RenderingSnafu { path })?;

    for r in rendered.iter() {
        let color = ratio_color(r.ratio);
        debug!(
            "render_map: {:?} ratio {:?} -> {:?}",
            r.result.region_name, r.ratio, color
        );
        for polygon in r.polygon.0.iter() {
            let ring: Vec<(f64, f64)> = polygon
                .exterior()
                .coords()
                .map(|c| projection.project(*c))
                .collect();
            chart
                .draw_series(std::iter::once(Polygon::new(ring.clone(), color.filled())))
                .context(RenderingSnafu { path })?;
            chart
                .draw_series(std::iter::once(PathElement::new(
                    ring,
                    BLACK.stroke_width(1),
                )))
                .context(RenderingSnafu { path })?;
        }
    }

    draw_legend(&legend_area, map_height).context(RenderingSnafu { path })?;
    root.present().context(RenderingSnafu { path })?;
    Ok(())
}

fn draw_legend(area: &DrawingArea<SVGBackend<'_>, Shift>, map_height: u32) -> DrawResult {
    let top: i32 = CAPTION_HEIGHT as i32 + 20;
    let bar_height: i32 = (map_height as i32 - 80).max(100);
    let left: i32 = 20;
    let width: i32 = 30;
    let y_of = |v: f64| top + ((1.0 - v) * bar_height as f64).round() as i32;

    area.draw(&Text::new(
        "ratio",
        (left, top - 30),
        ("sans-serif", 16).into_font(),
    ))?;
    let steps = 50;
    for i in 0..steps {
        let v0 = i as f64 / steps as f64;
        let v1 = (i + 1) as f64 / steps as f64;
        area.draw(&Rectangle::new(
            [(left, y_of(v1)), (left + width, y_of(v0))],
            ratio_color(Some((v0 + v1) / 2.0)).filled(),
        ))?;
    }
    area.draw(&Rectangle::new(
        [(left, top), (left + width, top + bar_height)],
        BLACK.stroke_width(1),
    ))?;
    for tick in 0..=4 {
        let v = tick as f64 / 4.0;
        area.draw(&Text::new(
            format!("{:.0}%", v * 100.0),
            (left + width + 8, y_of(v) - 7),
            ("sans-serif", 14).into_font(),
        ))?;
    }

    let y = top + bar_height + 20;
    area.draw(&Rectangle::new(
        [(left, y), (left + width, y + 16)],
        NO_DATA.filled(),
    ))?;
    area.draw(&Text::new(
        "no ballot",
        (left + width + 8, y),
        ("sans-serif", 14).into_font(),
    ))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn entry(name: &str, ratio: Option<f64>, x: f64) -> RegionMapEntry {
        RenderedRegionResult {
            result: RegionResult {
                region_code: "00".to_string(),
                region_name: name.to_string(),
                counts: BallotCounts::EMPTY,
            },
            polygon: MultiPolygon(vec![polygon![
                (x: x, y: 43.0),
                (x: x + 1.0, y: 43.0),
                (x: x + 1.0, y: 44.0),
                (x: x, y: 44.0),
            ]]),
            ratio,
        }
    }

    #[test]
    fn color_scale() {
        assert_eq!(ratio_color(Some(0.0)), RGBColor(68, 1, 84));
        assert_eq!(ratio_color(Some(1.0)), RGBColor(253, 231, 37));
        assert_eq!(ratio_color(Some(0.5)), RGBColor(33, 145, 140));
        assert_eq!(ratio_color(None), NO_DATA);
        assert_eq!(ratio_color(Some(f64::NAN)), NO_DATA);
    }

    #[test]
    fn bounds_cover_all_regions() {
        let rendered = vec![entry("a", Some(0.2), 0.0), entry("b", None, 5.0)];
        let b = map_bounds(&rendered).unwrap();
        assert_eq!(b.min(), coord! { x: 0.0, y: 43.0 });
        assert_eq!(b.max(), coord! { x: 6.0, y: 44.0 });
        assert_eq!(map_bounds(&[]), None);
    }

    #[test]
    fn draws_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.svg").display().to_string();
        let rendered = vec![entry("a", Some(0.2), 0.0), entry("b", None, 5.0)];
        render_map(&rendered, "test map", &path).unwrap();
        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("test map"));
        assert!(svg.contains("no ballot"));
    }

    #[test]
    fn draws_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.svg").display().to_string();
        render_map(&[], "empty", &path).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("<svg"));
    }
}
