//! Single room view (`/rooms/:id`).

use maud::{Markup, html};

use super::canvas;
use super::components::{app_shell, count_label};
use crate::api::Room;

/// Render a room with its canvas.
pub fn render(room: &Room) -> Markup {
    app_shell(html! {
        section class="room" data-room-id=(room.id) {
            h2 class="room-name" { (room.name) }
            div class="room-canvas" {
                (canvas::render(room.canvas_width, room.canvas_height, &room.strokes))
            }
            p class="room-watchers" {
                (count_label(room.watcher_count, "watcher"))
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_name_canvas_and_watchers() {
        let room = Room {
            id: 4,
            name: "doodle".to_string(),
            canvas_width: 300,
            canvas_height: 200,
            created_at: String::new(),
            strokes: Vec::new(),
            stroke_count: 0,
            watcher_count: 1,
        };

        let html = render(&room).into_string();
        assert!(html.contains(r#"data-room-id="4""#));
        assert!(html.contains("doodle"));
        assert!(html.contains(r#"viewBox="0 0 300 200""#));
        assert!(html.contains("1 watcher"));
    }
}
