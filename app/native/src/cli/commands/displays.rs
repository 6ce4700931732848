//! Display inspection command.

use colored::Colorize;
use serde::Serialize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::cli::output;
use crate::config;
use crate::display::DisplaySnapshot;
use crate::error::OvernotchError;
use crate::geometry::{Rect, Size, placement};

/// A display with the frame its closed notch gets.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayInfo {
    pub id: u32,
    pub name: String,
    pub frame: Rect,
    pub main: bool,
    pub notch: Rect,
}

#[derive(Tabled)]
struct DisplayRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Resolution")]
    resolution: String,
    #[tabled(rename = "Position")]
    position: String,
    #[tabled(rename = "Main")]
    main: String,
    #[tabled(rename = "Notch")]
    notch: String,
}

impl From<&DisplayInfo> for DisplayRow {
    fn from(info: &DisplayInfo) -> Self {
        Self {
            id: info.id,
            name: output::truncate(&info.name, 32),
            resolution: format!("{:.0}x{:.0}", info.frame.width, info.frame.height),
            position: format!("{:.0}, {:.0}", info.frame.x, info.frame.y),
            main: output::format_bool(info.main),
            notch: format!(
                "{:.0}x{:.0} at {:.1}, {:.1}",
                info.notch.width, info.notch.height, info.notch.x, info.notch.y
            ),
        }
    }
}

/// Describes every display in `snapshot` with its closed notch placement.
#[must_use]
pub fn describe(snapshot: &DisplaySnapshot, closed: Size) -> Vec<DisplayInfo> {
    let main = snapshot.main_display().map(|d| d.id);
    snapshot
        .displays
        .iter()
        .map(|display| DisplayInfo {
            id: display.id.0,
            name: display.name.clone(),
            frame: display.frame,
            main: main == Some(display.id),
            notch: placement(display.frame, closed),
        })
        .collect()
}

/// Execute the displays command.
///
/// # Errors
///
/// Returns an error if displays cannot be enumerated on this platform.
pub fn execute(json: bool) -> Result<(), OvernotchError> {
    let snapshot = snapshot()?;
    let infos = describe(&snapshot, config::get_config().notch.closed_size());

    if json {
        output::print_highlighted_json(&serde_json::to_value(&infos)?);
        return Ok(());
    }

    if infos.is_empty() {
        println!("{}", "No displays detected.".dimmed());
        return Ok(());
    }

    let rows: Vec<DisplayRow> = infos.iter().map(DisplayRow::from).collect();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .with(Modify::new(Columns::new(2..4)).with(Alignment::right()))
        .with(Modify::new(Columns::new(4..5)).with(Alignment::center()))
        .to_string();

    println!("{}", format!("Displays ({})", infos.len()).bold());
    println!("{table}");
    Ok(())
}

#[cfg(target_os = "macos")]
fn snapshot() -> Result<DisplaySnapshot, OvernotchError> {
    use std::sync::Arc;

    use crate::display::DisplayRegistry;
    use crate::display::macos::MacDisplays;

    Ok(DisplayRegistry::new(Arc::new(MacDisplays)).snapshot())
}

#[cfg(not(target_os = "macos"))]
fn snapshot() -> Result<DisplaySnapshot, OvernotchError> {
    Err(OvernotchError::UnsupportedPlatform(
        "display enumeration is only available on macOS".to_string(),
    ))
}
