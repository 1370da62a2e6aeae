//! Markup rendering for ISUketch views and canvas snapshots.
//!
//! Rendering is a pure function of its input: no I/O, and the same input
//! always produces the same markup. The page and snapshot pipelines depend
//! on the [`MarkupRenderer`] trait rather than on these functions directly,
//! so the renderer is injected into `AppState` at startup.
//!
//! All rendering uses [maud](https://maud.lambda.xyz/) for compile-time HTML
//! generation with automatic XSS protection (all dynamic values are escaped).

pub mod canvas;
pub mod components;
pub mod room;
pub mod room_list;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::api::{Room, Stroke};
use crate::error::SketchError;
use crate::loader::DataBag;
use crate::resolve::ViewId;

/// Turns view data into markup.
pub trait MarkupRenderer: Send + Sync {
    /// Render the application markup for `view` from its loaded data.
    fn render_view(&self, view: ViewId, data: &DataBag) -> Result<String, SketchError>;

    /// Render a canvas as a standalone `<svg>` element.
    fn render_canvas(&self, width: u32, height: u32, strokes: &[Stroke]) -> String;
}

/// The ISUketch renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SketchRenderer;

#[derive(Deserialize)]
struct RoomsPayload {
    rooms: Vec<Room>,
}

#[derive(Deserialize)]
struct RoomPayload {
    room: Room,
}

impl MarkupRenderer for SketchRenderer {
    fn render_view(&self, view: ViewId, data: &DataBag) -> Result<String, SketchError> {
        let markup = match view {
            ViewId::RoomList => {
                let payload: RoomsPayload = decode(data, "rooms")?;
                room_list::render(&payload.rooms)
            }
            ViewId::Room => {
                let payload: RoomPayload = decode(data, "room")?;
                room::render(&payload.room)
            }
        };
        Ok(markup.into_string())
    }

    fn render_canvas(&self, width: u32, height: u32, strokes: &[Stroke]) -> String {
        canvas::render(width, height, strokes).into_string()
    }
}

/// Decode one entry of the data bag.
fn decode<T: DeserializeOwned>(data: &DataBag, key: &str) -> Result<T, SketchError> {
    let value = data
        .get(key)
        .ok_or_else(|| SketchError::Render(format!("view data is missing '{key}'")))?;

    T::deserialize(value).map_err(|e| SketchError::Render(format!("invalid '{key}' data: {e}")))
}
