//! Room list view (`/`).

use maud::{Markup, html};

use super::components::{app_shell, count_label, format_created_at};
use crate::api::Room;

/// Render the list of recently drawn rooms.
pub fn render(rooms: &[Room]) -> Markup {
    app_shell(html! {
        section class="room-list" {
            h2 class="room-list-title" { "Rooms" }
            @if rooms.is_empty() {
                p class="room-list-empty" { "No rooms yet." }
            } @else {
                ul class="room-cards" {
                    @for room in rooms {
                        li class="room-card" {
                            a class="room-card-link" href={ "/rooms/" (room.id) } {
                                img class="room-thumb"
                                    src={ "/img/" (room.id) }
                                    alt=(room.name)
                                    width=(room.canvas_width)
                                    height=(room.canvas_height);
                                div class="room-card-name" { (room.name) }
                                div class="room-card-meta" {
                                    span { (count_label(room.stroke_count, "stroke")) }
                                    @if let Some(created) = format_created_at(&room.created_at) {
                                        " · "
                                        time datetime=(room.created_at) { (created) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    })
}
