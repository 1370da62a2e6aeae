//! Static SVG rendering of a room's canvas.
//!
//! One `<polyline>` per stroke, in drawing order, on a white background of
//! the canvas size. Output depends only on its input, so the same room
//! always renders to the same bytes.

use maud::{Markup, html};

use crate::api::Stroke;

/// Render the canvas as an `<svg>` element.
pub fn render(width: u32, height: u32, strokes: &[Stroke]) -> Markup {
    html! {
        svg xmlns="http://www.w3.org/2000/svg"
            version="1.1"
            baseProfile="full"
            width=(width)
            height=(height)
            style={ "width:" (width) "px;height:" (height) "px;background-color:white;" }
            viewBox={ "0 0 " (width) " " (height) } {
            @for stroke in strokes {
                polyline
                    id={ "stroke-" (stroke.id) }
                    stroke=(stroke_color(stroke))
                    stroke-width=(stroke.width)
                    stroke-linecap="round"
                    stroke-linejoin="round"
                    fill="none"
                    points=(stroke_points(stroke)) {}
            }
        }
    }
}

fn stroke_color(stroke: &Stroke) -> String {
    format!(
        "rgba({},{},{},{})",
        stroke.red, stroke.green, stroke.blue, stroke.alpha
    )
}

fn stroke_points(stroke: &Stroke) -> String {
    stroke
        .points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Point;

    fn stroke(id: u64, points: &[(f64, f64)]) -> Stroke {
        Stroke {
            id,
            room_id: 1,
            width: 8,
            red: 128,
            green: 0,
            blue: 255,
            alpha: 0.2,
            points: points
                .iter()
                .map(|&(x, y)| Point {
                    id: 0,
                    stroke_id: id,
                    x,
                    y,
                })
                .collect(),
            created_at: String::new(),
        }
    }

    #[test]
    fn empty_canvas() {
        let svg = render(100, 50, &[]).into_string();
        assert_eq!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" baseProfile="full" width="100" height="50" style="width:100px;height:50px;background-color:white;" viewBox="0 0 100 50"></svg>"#
        );
    }

    #[test]
    fn strokes_render_as_polylines_in_order() {
        let svg = render(
            100,
            100,
            &[stroke(1, &[(1.0, 2.5), (3.0, 4.0)]), stroke(2, &[(5.0, 6.0)])],
        )
        .into_string();

        assert!(svg.contains(
            r#"<polyline id="stroke-1" stroke="rgba(128,0,255,0.2)" stroke-width="8" stroke-linecap="round" stroke-linejoin="round" fill="none" points="1,2.5 3,4"></polyline>"#
        ));
        let first = svg.find("stroke-1").unwrap();
        let second = svg.find("stroke-2").unwrap();
        assert!(first < second);
    }

    #[test]
    fn rendering_is_deterministic() {
        let strokes = vec![stroke(7, &[(0.1, 0.2), (10.0, 20.0), (30.5, 40.25)])];
        assert_eq!(
            render(640, 480, &strokes).into_string(),
            render(640, 480, &strokes).into_string()
        );
    }
}
